pub mod builder;
pub mod server_state;
pub mod session;

pub use builder::ServerStateBuilder;
pub use server_state::ServerState;
pub use session::Session;
