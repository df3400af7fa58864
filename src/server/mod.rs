// Server module entry point
// Provides listener creation, connection handling and graceful shutdown

pub mod connection;
pub mod listener;
pub mod shutdown;

// `loop` is a keyword, so the accept-loop module lives in loop.rs as server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used types
pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
