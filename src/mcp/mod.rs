mod jsonrpc;
mod render;
mod server;
mod stdio;
mod tools;

pub use server::{McpServer, SERVER_NAME, SERVER_VERSION};
pub use stdio::run_stdio;
pub use tools::TOOLS;
