mod error;
mod interface;
mod manager;
mod process;

pub use error::ToolInvokeError;
pub use interface::{ServerToolInfo, ToolServerInterface};
pub use manager::ServerManager;
pub use process::spawn_and_list_tools;
