//! Record linkage and price unification across retail networks.
//!
//! Raw product listings from many sources go in; one [`basar_core::Catalog`]
//! of cross-network products comes out. The engine is synchronous and
//! deterministic for a given input order. Reading files and writing the
//! catalog are left to the caller.

pub mod catalog;
pub mod category;
pub mod dedupe;
pub mod error;
pub mod input;
pub mod linker;
pub mod network;
pub mod normalize;
pub mod pipeline;
pub mod price;
pub mod quality;
pub mod record;
pub mod savings;
pub mod similarity;
pub mod unified;

pub use catalog::assemble_catalog;
pub use category::CategoryResolver;
pub use dedupe::DuplicateFilter;
pub use error::EngineError;
pub use input::{parse_source, read_document, InputShape, SourceBatch};
pub use linker::{ClusterMember, Linkage, ProductCluster, RecordLinker};
pub use network::{NetworkResolver, ResolvedBy};
pub use normalize::{NameNormalizer, NormalizedKey};
pub use pipeline::{Engine, EngineSettings, RunStats, SourceDocument, UnifyOutcome};
pub use price::{PriceBounds, PriceExtractor};
pub use quality::record_quality;
pub use record::PreparedRecord;
pub use savings::analyze_savings;
pub use similarity::ratio;
pub use unified::UnifiedProductBuilder;
