use crate::error::{JigglerError, Result};
use tracing::{debug, info};

#[cfg(unix)]
pub use self::unix::InstanceGuard;
#[cfg(windows)]
pub use self::windows::InstanceGuard;

#[cfg(unix)]
mod unix {
    use super::*;
    use nix::errno::Errno;
    use nix::fcntl::{Flock, FlockArg};
    use std::fs::{File, OpenOptions};
    use std::io::Write;
    use std::path::{Path, PathBuf};

    /// Эксклюзивный flock на файле блокировки; снимается при Drop
    pub struct InstanceGuard {
        lock: Flock<File>,
        path: PathBuf,
    }

    impl InstanceGuard {
        pub fn acquire(name: &str) -> Result<Self> {
            let dir = std::env::var_os("XDG_RUNTIME_DIR")
                .map(PathBuf::from)
                .filter(|dir| dir.is_dir())
                .unwrap_or_else(std::env::temp_dir);

            Self::acquire_in(&dir, name)
        }

        pub fn acquire_in(dir: &Path, name: &str) -> Result<Self> {
            let path = dir.join(format!("{}.lock", name));
            debug!("Файл блокировки экземпляра: {:?}", path);

            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&path)?;

            let lock = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(lock) => lock,
                Err((_, Errno::EWOULDBLOCK)) => {
                    let owner = std::fs::read_to_string(&path).unwrap_or_default();
                    return Err(JigglerError::AlreadyRunningInstance(format!(
                        "{:?} удерживается процессом {}",
                        path,
                        owner.trim()
                    )));
                }
                Err((_, errno)) => return Err(JigglerError::Io(errno.into())),
            };

            let mut writer: &File = &lock;
            writer.set_len(0)?;
            writeln!(writer, "{}", std::process::id())?;

            info!("Блокировка экземпляра получена: {:?}", path);
            Ok(Self { lock, path })
        }
    }

    impl Drop for InstanceGuard {
        fn drop(&mut self) {
            let _ = self.lock.set_len(0);
            debug!("Блокировка экземпляра {:?} снята", self.path);
        }
    }
}

#[cfg(windows)]
mod windows {
    use super::*;
    use ::windows::core::HSTRING;
    use ::windows::Win32::Foundation::{CloseHandle, GetLastError, BOOL, ERROR_ALREADY_EXISTS, HANDLE};
    use ::windows::Win32::System::Threading::CreateMutexW;

    /// Именованный мьютекс сессии; закрывается при Drop
    pub struct InstanceGuard {
        handle: HANDLE,
    }

    impl InstanceGuard {
        pub fn acquire(name: &str) -> Result<Self> {
            let mutex_name = HSTRING::from(format!("Local\\{}", name));

            let handle = unsafe { CreateMutexW(None, BOOL::from(false), &mutex_name) }
                .map_err(|e| JigglerError::Internal(format!("CreateMutexW: {}", e)))?;

            if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
                unsafe {
                    let _ = CloseHandle(handle);
                }
                return Err(JigglerError::AlreadyRunningInstance(mutex_name.to_string()));
            }

            info!("Блокировка экземпляра получена: {}", mutex_name);
            Ok(Self { handle })
        }
    }

    impl Drop for InstanceGuard {
        fn drop(&mut self) {
            unsafe {
                let _ = CloseHandle(self.handle);
            }
            debug!("Блокировка экземпляра снята");
        }
    }
}
