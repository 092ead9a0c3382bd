use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::Local;
use env_logger::{Env, Target};
use log::{Level, Log, Metadata, Record};

const SERVICE_TARGET: &str = "subscription_service";

/// 安装进程级JSON行日志，`RUST_LOG` 优先于 `default_level`
pub fn init_logger(default_level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();
}

/// 转发到全局已安装的日志器
struct GlobalSink;

impl Log for GlobalSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        log::logger().log(record)
    }

    fn flush(&self) {
        log::logger().flush()
    }
}

/// 构造服务时注入的日志协作者
#[derive(Clone)]
pub struct AppLogger {
    sink: Arc<dyn Log>,
}

impl AppLogger {
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self { sink }
    }

    /// 通过全局 `log` 门面输出
    pub fn global() -> Self {
        Self::new(Arc::new(GlobalSink))
    }

    /// 在一次操作期间绑定到单个请求
    pub fn scoped<'a>(&'a self, request_id: &'a str) -> RequestLogger<'a> {
        RequestLogger {
            sink: self.sink.as_ref(),
            request_id,
        }
    }
}

impl fmt::Debug for AppLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppLogger").finish_non_exhaustive()
    }
}

pub struct RequestLogger<'a> {
    sink: &'a dyn Log,
    request_id: &'a str,
}

impl RequestLogger<'_> {
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args)
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args)
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args)
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder()
            .level(level)
            .target(SERVICE_TARGET)
            .build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(format_args!("[request_id={}] {}", self.request_id, args))
                .build(),
        );
    }
}

/// 将日志记录保存在内存中，便于断言日志输出
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Log for MemorySink {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}
