//! # bloblocality Crate Overview
//!
//! `bloblocality` implements a locality-aware scoring plugin for a container
//! orchestrator's scheduler, paired with the per-node inspection daemon it
//! queries. When the scheduler is choosing a node for a workload, the plugin
//! biases the choice toward nodes that already hold the greatest byte-weight
//! of the artifacts — software bundles and container image layers — the
//! workload will need, trading a little scoring latency for less pull time
//! and cold-start at placement.
//!
//! ## Highlights
//! - A self-registering [`oracle`] of ecosystem version grammars (PyPI,
//!   DockerHub, Apt, HuggingFace, and the exact-match ecosystems), with no
//!   central dispatch switch.
//! - A [`resolver`] that expands a container reference into its bundle or
//!   layer dependency list.
//! - An axum-backed [`daemon`] answering "how many bytes of this dependency
//!   list does this node already have?" over HTTP.
//! - A [`plugin`] module implementing the scheduler-side scoring contract,
//!   including the spread-mitigation ("de-heating") penalty.
//!
//! ## Crate Layout
//! - [`oracle`]: version-match grammars, one module per ecosystem.
//! - [`resolver`]: container-reference normalization and dependency expansion.
//! - [`daemon`]: the node inspection HTTP server and its on-disk catalogs.
//! - [`plugin`]: the scheduler scoring algorithm.
//! - [`net`]: the shared outbound HTTP client.
//! - [`error`]: shared error types at component seams.

pub mod daemon;
pub mod error;
pub mod net;
pub mod oracle;
pub mod plugin;
pub mod resolver;
