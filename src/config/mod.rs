mod server;

pub use server::{
    CONFIG_FILE_NAME, DEFAULT_MAX_UPLOAD_BYTES, FileConfig, FileNotifyConfig, NotifyConfig,
    ServerConfig,
};
