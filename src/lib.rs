//! Semantic knowledge store: write text, find it again by meaning.
//!
//! Lorebook stores short texts ("entries") with a category and tags, keyed by
//! the SHA-256 of their content, and retrieves them by cosine similarity of
//! their embeddings. It is exposed as an HTTP/JSON API and as
//! [MCP](https://modelcontextprotocol.io/) tools.
//!
//! # Architecture
//!
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec) for vector search
//! - **Embeddings**: Local ONNX Runtime with paraphrase-multilingual-MiniLM-L12-v2 (384 dimensions),
//!   or an offline feature-hashing provider
//! - **Transport**: HTTP (axum) with MCP over streamable HTTP at `/mcp`, or MCP over stdio
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files and environment variables
//! - [`db`] - SQLite initialization, schema, migrations, and health checks
//! - [`embedding`] - Text-to-vector providers
//! - [`index`] - Vector index contract and its sqlite-vec adapter
//! - [`knowledge`] - Entry lifecycle: write, search, update, delete, list
//! - [`api`] - HTTP routes
//! - [`tools`] - MCP tool handler

pub mod api;
pub mod config;
pub mod db;
pub mod embedding;
pub mod index;
pub mod knowledge;
pub mod tools;
