//! `WTInfo` 的类别和索引

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum Category {
    Interface = 1,
    Status = 2,
    DefContext = 3,
    DefSysCtx = 4,
    Devices = 100,
    Cursors = 200,
    Extensions = 300,
    DdCtxs = 400,
    DsCtxs = 500,
}

impl Category {
    /// 第 `device` 个设备的类别, `-1` 是虚拟设备
    pub fn device(device: i32) -> u32 {
        u32::from(Self::Devices).wrapping_add_signed(device)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum InterfaceIndex {
    WintabId = 1,
    SpecVersion = 2,
    ImplVersion = 3,
    NDevices = 4,
    NCursors = 5,
    NContexts = 6,
    CtxOptions = 7,
    CtxSaveSize = 8,
    NExtensions = 9,
    NManagers = 10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ContextIndex {
    Name = 1,
    Options = 2,
    Status = 3,
    Locks = 4,
    MsgBase = 5,
    Device = 6,
    PktRate = 7,
    PktData = 8,
    PktMode = 9,
    MoveMask = 10,
    BtnDnMask = 11,
    BtnUpMask = 12,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum DeviceIndex {
    Name = 1,
    Hardware = 2,
    NCsrTypes = 3,
    FirstCsr = 4,
    PktRate = 5,
    PktData = 6,
    PktMode = 7,
    CsrData = 8,
    XMargin = 9,
    YMargin = 10,
    ZMargin = 11,
    X = 12,
    Y = 13,
    Z = 14,
    NPressure = 15,
    TPressure = 16,
    Orientation = 17,
    Rotation = 18,
    PnpId = 19,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum CursorIndex {
    Name = 1,
    Active = 2,
    PktData = 3,
    Buttons = 4,
    ButtonBits = 5,
}

/// 指向具体光标类型的光标类别 (`Category::Cursors + n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum CursorName {
    Puck = 200,
    PressureStylus = 201,
    Eraser = 202,
}

/// 数位板轴, 数值等于对应的 [`DeviceIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum AxisDimension {
    X = 12,
    Y = 13,
    Z = 14,
}

/// 扩展类别 (`Category::Extensions + n`) 下的索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ExtensionIndex {
    Name = 1,
    Tag = 2,
    Mask = 3,
    Size = 4,
    Axes = 5,
    Default = 6,
    DefContext = 7,
    DefSysCtx = 8,
    Cursors = 9,
}

/// 驱动给扩展分配的标签, 按 `ExtensionIndex::Tag` 读出来比对
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ExtensionTag {
    OutOfBoundsTracking = 0,
    FunctionKeys = 1,
    Tilt = 2,
    CursorMask = 3,
    ExtendedButtonMask = 4,
    ExpressKeys = 5,
    TouchStrip = 6,
    TouchRing = 7,
    ExpressKeys2 = 8,
}

/// 扩展类别最多占到下一个类别之前
pub const MAX_EXTENSIONS: u32 = Category::DdCtxs as u32 - Category::Extensions as u32;
