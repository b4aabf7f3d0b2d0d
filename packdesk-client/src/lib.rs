//! Packdesk Client - warehouse fulfillment station client
//!
//! Picks orders against barcode scans, walks them through
//! `processing → packed → completed`, syncs statuses with the upstream shop
//! through the backend and queues stock corrections.

pub mod adjustments;
pub mod config;
pub mod csrf;
pub mod error;
pub mod fulfillment;
pub mod http;
pub mod logger;
pub mod notice;
pub mod pick;
pub mod scan;
pub mod session;
pub mod store;
pub mod sync;

pub use config::{ClientConfig, PollSettings};
pub use error::{ClientError, ClientResult};
pub use http::{RestApi, WarehouseApi};

pub use adjustments::{AdjustmentError, AdjustmentStore, EnrichedAdjustment};
pub use fulfillment::{CompletionGate, StatusChange, TransitionError, TransitionPlan};
pub use notice::{Notice, NoticeBoard, Severity};
pub use pick::{PickError, PickLedger, PickUpdate, ScanRejection};
pub use scan::{Key, KeyDisposition, KeyEvent, KeySender, ScanAccumulator, ScanListener};
pub use session::{PickSession, StockSession};
pub use store::OrderStore;
pub use sync::{PushOutcome, SyncCoordinator, SyncError};

// Re-export shared types for convenience
pub use shared::{FulfillmentStatus, Order, OrderItem, PickStatus};
