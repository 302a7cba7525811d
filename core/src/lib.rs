pub mod config;
pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod models;
pub mod navigation;
pub mod normalizer;
pub mod pagination;
pub mod render;
pub mod seed;
pub mod segmenter;
pub mod session;

pub use config::{SelfPolicy, ViewerConfig};
pub use decode::{decode_bytes, DecodeJob, DecodeResponse, DecodeWorker};
pub use error::CoreError;
pub use session::{LoadedChat, Session};
