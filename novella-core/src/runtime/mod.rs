pub mod assets;
pub mod audio;
pub mod ctx;
pub mod stage;

pub use assets::{AnyAssets, AssetKind, AssetResolver, FsAssetResolver, MemoryAssets};
pub use audio::{AudioSink, LogAudio, NullAudio};
pub use ctx::Ctx;
pub use stage::{DialogueRecord, ObjectKind, Stage, StageObject};
