pub mod agent;
pub mod random;
pub mod remote;

pub use agent::{Agent, CheatingAgent};
pub use random::RandomAgent;
pub use remote::{PlayerService, RemoteAgent, RemoteError, ServiceRequest};
