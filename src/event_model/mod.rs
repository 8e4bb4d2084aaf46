/// 消息与事件参数
pub mod event;
/// 驱动记录布局
pub mod record;

pub use event::{EndpointHandle, MessageReceived, NativeMessage, WintabMessage};
pub use record::{
    ExpressKeyData, ExtensionBase, Orientation, Rotation, SliderData, WtAxis, WtAxisArray,
    WtPacket, WtPacketExt,
};
