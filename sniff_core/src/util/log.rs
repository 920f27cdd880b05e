use std::sync::{Once, atomic::{AtomicBool, Ordering}};
use std::fs::File;

use crate::config::Config;

static INIT_LOGGER: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// 初始化日志。日志只写到stderr或日志文件，stdout留给报告输出
pub fn init_logger(config: &Config) {
    if !LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        INIT_LOGGER.call_once(|| {
            let mut builder = env_logger::Builder::new();
            builder.target(env_logger::Target::Stderr);
            if let Some(path) = &config.log_file {
                match File::create(path) {
                    Ok(file) => {
                        builder.target(env_logger::Target::Pipe(Box::new(file)));
                    }
                    Err(e) => eprintln!("无法创建日志文件 {}: {}", path.display(), e),
                }
            }
            builder.parse_filters(&config.log_level);
            builder.parse_default_env();
            let _ = builder.try_init();
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = Config::default();
        init_logger(&config);
        init_logger(&config);
        assert!(LOGGER_INITIALIZED.load(Ordering::SeqCst));
        log::info!("测试开始");
    }
}
