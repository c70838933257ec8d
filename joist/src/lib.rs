pub mod context;
pub mod driver;
pub mod error;
pub mod focus;
pub mod handle;
pub mod identity;
pub mod keys;
pub mod notifier;
pub mod panel;
pub mod registry;
pub mod render;
pub mod selection;
pub mod state;
pub mod widgets;

pub mod prelude {
    pub use crate::context::{ContextConsumer, ContextProvider};
    pub use crate::driver::{AnimationDriver, InstantDriver, TransitionCallbacks, TransitionSink};
    pub use crate::error::{ConfigError, DriverError};
    pub use crate::focus::{Direction, FocusMove, FocusPolicy, Orientation, RovingFocus};
    pub use crate::handle::ElementHandle;
    pub use crate::identity::ItemKey;
    pub use crate::keys::Key;
    pub use crate::notifier::{ChangeNotifier, ChangeReason, ChangeRequest, ListenerId};
    pub use crate::panel::{
        HiddenMode, PanelConfig, PanelLifecycle, PanelPhase, PanelSnapshot, Presence, Transition,
        sync_all,
    };
    pub use crate::registry::{CompositeRegistry, DocumentPosition};
    pub use crate::render::{RenderPass, RenderReceiver, RenderSender, RenderSource, SourceKind};
    pub use crate::selection::SelectionMode;
    pub use crate::state::ControlledValueStore;
    pub use crate::widgets::{
        Accordion, AccordionConfig, AccordionItem, CheckedState, Checkbox, Collapsible,
        CollapsibleConfig, Meter, NavigationMenu, NavigationMenuConfig, NavigationMenuItem,
        Progress, ProgressStatus, Radio, RadioConfig, RadioGroup, RangeConfig, Slider,
        SliderConfig, Switch, Toolbar, ToolbarConfig, ToolbarItem,
    };
}
