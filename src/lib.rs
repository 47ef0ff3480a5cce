//! Orbit: agentic run orchestration.
//!
//! Drives a streamed model run through repeated tool rounds: tool-call
//! argument fragments are tracked as they arrive, strict-schema artifacts are
//! reconciled away, registered tools run concurrently and their results feed
//! the next round until the model answers with text alone.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use orbit::prelude::*;
//!
//! # async fn example() -> orbit::error::Result<()> {
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(AgentTool::new(
//!     "time",
//!     "Current UTC time",
//!     ToolParameters::empty(),
//!     |_args, _ctx| async move { Ok(serde_json::json!(chrono::Utc::now().to_rfc3339())) },
//! )))?;
//!
//! let config = OrbitConfig::load()?;
//! let transport = HttpRunTransport::from_config(&config)?;
//! let controller = RunController::new(Arc::new(transport))
//!     .with_registry(Arc::new(registry))
//!     .with_config(config);
//!
//! if let RunOutcome::Completed(output) = controller.run("What time is it?", RunOptions::default()).await? {
//!     println!("{}", output.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod run;
pub mod schema;
pub mod tools;
pub mod tracker;
pub mod transport;
pub mod types;
