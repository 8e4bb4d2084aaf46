//! 驱动内存与类型化值之间的搬运
//!
//! 驱动把数据写进调用方预先分配的 [`ForeignRegion`], 再由这里按记录布局读出来.
//! 尺寸对不上时不报错, 而是返回全零值: 下游代码把全零当成 "没有数据" 的信号.

mod region;

pub use region::ForeignRegion;

use std::{mem, ptr};

use tracing::{trace, warn};

use crate::error::{BridgeError, Result};

/// 和驱动交换的定长二进制值
///
/// # Safety
///
/// 实现者必须是 `#[repr(C)]` (或基本类型) 的纯数据: 不含指针, 没有填充,
/// 任意位模式 (包括全零) 都是合法值.
pub unsafe trait Record: Copy + Send + 'static {
    /// 声明的布局大小, 也是数组步长
    const SIZE: usize = mem::size_of::<Self>();

    /// 尺寸对不上时代替真实数据返回的全零值
    fn zeroed() -> Self {
        // SAFETY: guaranteed valid by the trait contract.
        unsafe { mem::zeroed() }
    }
}

unsafe impl Record for u8 {}
unsafe impl Record for u16 {}
unsafe impl Record for u32 {}
unsafe impl Record for u64 {}
unsafe impl Record for i32 {}

/// 从字节窗口读一条记录, 长度不等于 `T::SIZE` 就是全零值
fn read_record<T: Record>(bytes: &[u8]) -> T {
    if bytes.len() != T::SIZE {
        return T::zeroed();
    }
    // SAFETY: exactly `T::SIZE` readable bytes; every pattern is a valid `T`.
    unsafe { ptr::read_unaligned(bytes.as_ptr().cast::<T>()) }
}

/// 把 `region` 开头解释成一个 `T`
///
/// `reported_size` 和 `T::SIZE` 不同时根本不看字节内容, 直接返回全零值.
pub fn read_as<T: Record>(region: &ForeignRegion, reported_size: usize) -> Result<T> {
    if region.is_empty() {
        return Err(BridgeError::InvalidArgument("read_as on an empty region"));
    }
    if reported_size != T::SIZE {
        trace!(
            reported_size,
            declared = T::SIZE,
            record = std::any::type_name::<T>(),
            "size mismatch, returning zero value"
        );
        return Ok(T::zeroed());
    }
    match region.as_bytes().get(..T::SIZE) {
        Some(bytes) => Ok(read_record(bytes)),
        None => Err(BridgeError::InvalidArgument(
            "region is smaller than the record it claims to hold",
        )),
    }
}

/// 按 UTF-16LE 解码前 `byte_len` 个字节, 末尾落单的字节忽略
pub fn read_string(region: &ForeignRegion, byte_len: usize) -> Result<String> {
    if region.is_empty() {
        return Err(BridgeError::InvalidArgument("read_string on an empty region"));
    }
    if byte_len == 0 {
        return Err(BridgeError::InvalidArgument("read_string with zero length"));
    }
    let bytes = region
        .as_bytes()
        .get(..byte_len)
        .ok_or(BridgeError::InvalidArgument("string length exceeds region"))?;

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}

/// 从 `region` 里按顺序读出 `count` 条紧密排列的记录
///
/// `count == 0` 或空区域表示 "没有数据", 返回空 `Vec`.
/// 只有一部分落在区域内的记录在原位置上退化为全零值; 完全落在区域之外的
/// 记录不会产生输出, 驱动报出的离谱数量不会导致超大分配.
pub fn read_array<T: Record>(count: usize, region: &ForeignRegion) -> Vec<T> {
    if count == 0 || region.is_empty() {
        return Vec::new();
    }
    let bytes = region.as_bytes();
    let stride = T::SIZE.max(1);
    let reachable = bytes.len().div_ceil(stride);
    if reachable < count {
        warn!(
            count,
            reachable,
            record = std::any::type_name::<T>(),
            "region holds fewer records than requested"
        );
    }

    bytes
        .chunks(stride)
        .take(count)
        .map(read_record)
        .collect()
}
