//! 与 Wintab 二进制兼容的记录类型
//!
//! 布局逐字节对应驱动写出的格式, 大小在编译期校验.

use crate::foreign::Record;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orientation {
    pub azimuth: i32,
    pub altitude: i32,
    pub twist: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rotation {
    pub pitch: i32,
    pub roll: i32,
    pub yaw: i32,
}

/// 一个笔数据包
///
/// `context == 0` 表示驱动没有给出这个包 (见 [`crate::foreign::read_as`]).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WtPacket {
    pub context: u32,
    pub status: u32,
    pub time: u32,
    pub changed: u32,
    pub serial_number: u32,
    pub cursor: u32,
    pub buttons: u32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub normal_pressure: i32,
    pub tangent_pressure: i32,
    pub orientation: Orientation,
    pub rotation: Rotation,
}

impl WtPacket {
    pub fn is_available(&self) -> bool {
        self.context != 0
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionBase {
    pub context: u32,
    pub status: u32,
    pub time: u32,
    pub serial_number: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpressKeyData {
    pub tablet: u8,
    pub control: u8,
    pub location: u8,
    pub reserved: u8,
    pub state: u32,
}

/// 触控条或触控环的一次采样
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliderData {
    pub tablet: u8,
    pub control: u8,
    pub mode: u8,
    pub reserved: u8,
    pub position: u32,
}

/// 扩展控件 (快捷键, 触控条, 触控环) 数据包
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WtPacketExt {
    pub base: ExtensionBase,
    pub express_keys: ExpressKeyData,
    pub touch_strip: SliderData,
    pub touch_ring: SliderData,
}

impl WtPacketExt {
    pub fn is_available(&self) -> bool {
        self.base.context != 0
    }
}

/// 一个轴的范围和分辨率, `resolution` 是 16.16 定点数
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WtAxis {
    pub min: i32,
    pub max: i32,
    pub units: u32,
    pub resolution: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WtAxisArray {
    pub axes: [WtAxis; 3],
}

impl WtAxisArray {
    /// 前两个轴都有分辨率才算支持 (倾斜或旋转)
    pub fn is_supported(&self) -> bool {
        self.axes[0].resolution != 0 && self.axes[1].resolution != 0
    }
}

// SAFETY: all of the above are repr(C) integer aggregates without padding.
unsafe impl Record for Orientation {}
unsafe impl Record for Rotation {}
unsafe impl Record for WtPacket {}
unsafe impl Record for ExtensionBase {}
unsafe impl Record for ExpressKeyData {}
unsafe impl Record for SliderData {}
unsafe impl Record for WtPacketExt {}
unsafe impl Record for WtAxis {}
unsafe impl Record for WtAxisArray {}

const _: () = assert!(WtPacket::SIZE == 72);
const _: () = assert!(WtPacketExt::SIZE == 40);
const _: () = assert!(WtAxis::SIZE == 16);
const _: () = assert!(WtAxisArray::SIZE == 48);
