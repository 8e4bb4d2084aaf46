//! 驱动调用面
//!
//! 驱动本身不在这里实现, 这里只定义调用约定: 调用方预先分配好足够大的
//! [`ForeignRegion`], 驱动往里写数据并返回写入的字节数 (或记录数).

pub mod consts;
pub mod data;
pub mod info;

pub use data::TabletData;
pub use info::TabletInfo;

use std::{ffi::c_void, ptr};

use crate::foreign::ForeignRegion;

/// `WTInfo` 调用: 把 `(category, index)` 的应答写进 `output`, 返回写入的字节数,
/// `0` 表示不支持或没有数据. 传 `None` 时驱动拿到空指针, 只报告尺寸.
pub trait InfoSource: Send + Sync {
    fn info(&self, category: u32, index: u32, output: Option<&mut ForeignRegion>) -> u32;
}

/// 一个已打开的驱动上下文的包队列
pub trait PacketSource: Send + Sync {
    /// 把最多 `max` 个排队的包移进 `output`, 返回写入的个数.
    /// `output` 为空时驱动收到空指针, 包被直接丢弃.
    fn packets_get(&self, context: u32, max: u32, output: &mut ForeignRegion) -> u32;

    /// 同 [`PacketSource::packets_get`], 但包留在队列里
    fn packets_peek(&self, context: u32, max: u32, output: &mut ForeignRegion) -> u32;

    /// 把序号为 `serial` 的包拷进 `output`, 驱动已经没有这个包时返回 `false`
    fn packet(&self, context: u32, serial: u32, output: &mut ForeignRegion) -> bool;
}

impl<T: InfoSource + ?Sized> InfoSource for &T {
    fn info(&self, category: u32, index: u32, output: Option<&mut ForeignRegion>) -> u32 {
        (**self).info(category, index, output)
    }
}

impl<T: PacketSource + ?Sized> PacketSource for &T {
    fn packets_get(&self, context: u32, max: u32, output: &mut ForeignRegion) -> u32 {
        (**self).packets_get(context, max, output)
    }

    fn packets_peek(&self, context: u32, max: u32, output: &mut ForeignRegion) -> u32 {
        (**self).packets_peek(context, max, output)
    }

    fn packet(&self, context: u32, serial: u32, output: &mut ForeignRegion) -> bool {
        (**self).packet(context, serial, output)
    }
}

pub type WtInfoFn = unsafe extern "system" fn(u32, u32, *mut c_void) -> u32;
pub type WtPacketsFn = unsafe extern "system" fn(u32, i32, *mut c_void) -> i32;
pub type WtPacketFn = unsafe extern "system" fn(u32, u32, *mut c_void) -> i32;

fn destination(output: Option<&mut ForeignRegion>) -> *mut c_void {
    output.map_or(ptr::null_mut(), ForeignRegion::as_mut_ptr)
}

/// 基于原始 `WTInfoW` 入口的 [`InfoSource`]
#[derive(Clone, Copy)]
pub struct RawInfoFn(WtInfoFn);

impl RawInfoFn {
    /// # Safety
    ///
    /// `info` 必须是驱动的 `WTInfoW` (或行为一致), 并且在使用期间保持加载.
    /// 调用方分配的目的地必须容得下所查选择子的最大应答.
    pub unsafe fn new(info: WtInfoFn) -> Self {
        Self(info)
    }
}

impl InfoSource for RawInfoFn {
    fn info(&self, category: u32, index: u32, output: Option<&mut ForeignRegion>) -> u32 {
        // SAFETY: upheld by the contract of `RawInfoFn::new`.
        unsafe { (self.0)(category, index, destination(output)) }
    }
}

/// 基于原始 `WTPacketsGet`, `WTPacketsPeek`, `WTPacket` 入口的 [`PacketSource`]
#[derive(Clone, Copy)]
pub struct RawPacketFns {
    packets_get: WtPacketsFn,
    packets_peek: WtPacketsFn,
    packet: WtPacketFn,
}

impl RawPacketFns {
    /// # Safety
    ///
    /// 指针必须是对应的驱动入口, 在使用期间保持加载;
    /// 打开的上下文的包布局必须和读回的记录类型一致.
    pub unsafe fn new(packets_get: WtPacketsFn, packets_peek: WtPacketsFn, packet: WtPacketFn) -> Self {
        Self {
            packets_get,
            packets_peek,
            packet,
        }
    }
}

fn clamp_count(max: u32) -> i32 {
    i32::try_from(max).unwrap_or(i32::MAX)
}

impl PacketSource for RawPacketFns {
    fn packets_get(&self, context: u32, max: u32, output: &mut ForeignRegion) -> u32 {
        // SAFETY: upheld by the contract of `RawPacketFns::new`.
        let count = unsafe { (self.packets_get)(context, clamp_count(max), output.as_mut_ptr()) };
        count.max(0) as u32
    }

    fn packets_peek(&self, context: u32, max: u32, output: &mut ForeignRegion) -> u32 {
        // SAFETY: upheld by the contract of `RawPacketFns::new`.
        let count = unsafe { (self.packets_peek)(context, clamp_count(max), output.as_mut_ptr()) };
        count.max(0) as u32
    }

    fn packet(&self, context: u32, serial: u32, output: &mut ForeignRegion) -> bool {
        // SAFETY: upheld by the contract of `RawPacketFns::new`.
        unsafe { (self.packet)(context, serial, output.as_mut_ptr()) != 0 }
    }
}
