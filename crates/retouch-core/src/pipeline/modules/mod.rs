mod blur;
mod channel;
mod filter;
mod overlay;
mod tone;

pub use blur::{Blur, Sharpen};
pub use channel::{ChannelScale, Gamma};
pub use filter::{Brightness, Contrast, HueRotate, Saturate, Sepia};
pub use overlay::{BlendMode, Grain, SplitTone, TonalRange, VIGNETTE_INNER, Vignette, noise};
pub use tone::{HighlightsShadows, Vibrance};
