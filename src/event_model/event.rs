use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Wintab 消息号, 从 `WT_DEFBASE` 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum WintabMessage {
    Packet = 0x7FF0,
    CtxOpen = 0x7FF1,
    CtxClose = 0x7FF2,
    CtxUpdate = 0x7FF3,
    CtxOverlap = 0x7FF4,
    Proximity = 0x7FF5,
    InfoChange = 0x7FF6,
    CsrChange = 0x7FF7,
    PacketExt = 0x7FF8,
}

/// 消息循环接收端点的不透明句柄
///
/// Windows 上是 message-only 窗口的 `HWND`, 其他平台是进程内唯一的信箱号.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointHandle(pub usize);

/// 原始消息, 原样转发给订阅者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMessage {
    pub endpoint: EndpointHandle,
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl NativeMessage {
    pub fn kind(&self) -> Option<WintabMessage> {
        WintabMessage::try_from(self.id).ok()
    }
}

/// "收到消息" 事件的参数
#[derive(Debug, Clone)]
pub struct MessageReceived {
    message: NativeMessage,
}

impl MessageReceived {
    pub fn new(message: NativeMessage) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &NativeMessage {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_map_to_kinds() {
        let message = NativeMessage {
            endpoint: EndpointHandle(1),
            id: 0x7FF0,
            wparam: 12,
            lparam: 0x55,
        };
        assert_eq!(message.kind(), Some(WintabMessage::Packet));
        assert_eq!(u32::from(WintabMessage::PacketExt), 0x7FF8);
    }

    #[test]
    fn unknown_id_has_no_kind() {
        let message = NativeMessage {
            endpoint: EndpointHandle(1),
            id: 42,
            wparam: 0,
            lparam: 0,
        };
        assert_eq!(message.kind(), None);
        assert_eq!(MessageReceived::new(message).message().id, 42);
    }
}
