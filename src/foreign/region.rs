use std::{
    alloc::{self, Layout},
    ffi::c_void,
    fmt,
    ptr::{self, NonNull},
    slice,
};

use tracing::trace;

use super::Record;
use crate::error::{BridgeError, Result};

/// 所有驱动内存块的对齐, 对任何记录都够用
const REGION_ALIGN: usize = 8;

/// 一块交给驱动按裸地址写入的内存
///
/// drop 时释放, 分配它的操作无论从哪条路径退出都会还回去.
/// 既不是 `Send` 也不是 `Sync`: 区域只在一个线程的一次调用里存活.
pub struct ForeignRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl ForeignRegion {
    /// 未分配的区域, 释放它什么都不做
    pub const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
        }
    }

    /// 分配 `size` 个清零的字节, `size == 0` 得到 [`ForeignRegion::empty`]
    pub fn allocate(size: usize) -> Result<Self> {
        if size == 0 {
            return Ok(Self::empty());
        }
        let layout = Layout::from_size_align(size, REGION_ALIGN)
            .map_err(|_| BridgeError::Allocation { size })?;
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(BridgeError::Allocation { size })?;
        trace!(size, "allocated foreign region");
        Ok(Self { ptr, len: size })
    }

    /// 按一个 `T` 的大小分配
    pub fn allocate_for<T: Record>() -> Result<Self> {
        Self::allocate(T::SIZE)
    }

    /// 分配能放下 `count` 个紧密排列的 `T` 的区域
    pub fn allocate_array<T: Record>(count: usize) -> Result<Self> {
        let size = T::SIZE
            .checked_mul(count)
            .ok_or(BridgeError::Allocation { size: usize::MAX })?;
        Self::allocate(size)
    }

    /// 新分配一块区域并拷入 `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut region = Self::allocate(bytes.len())?;
        region.as_bytes_mut().copy_from_slice(bytes);
        Ok(region)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const u8 {
        if self.is_empty() {
            ptr::null()
        } else {
            self.ptr.as_ptr()
        }
    }

    /// 交给驱动的基地址, 空区域为空指针
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        if self.is_empty() {
            ptr::null_mut()
        } else {
            self.ptr.as_ptr().cast()
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the block is `len` initialized bytes (zeroed on allocation)
        // owned by `self`; a dangling pointer is valid for a zero-length slice.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: see `as_bytes`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// 在字节偏移 `offset` 处写入 `value`
    pub fn write_at<T: Record>(&mut self, offset: usize, value: &T) -> Result<()> {
        let end = offset
            .checked_add(T::SIZE)
            .ok_or(BridgeError::InvalidArgument("record offset overflows"))?;
        if end > self.len {
            return Err(BridgeError::InvalidArgument("record does not fit in region"));
        }
        // SAFETY: bounds checked above; unaligned write copes with any offset.
        unsafe {
            ptr::write_unaligned(self.ptr.as_ptr().add(offset).cast::<T>(), *value);
        }
        Ok(())
    }

    /// 归还内存, 和 drop 等价, 只是在调用处写得更显眼
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for ForeignRegion {
    fn drop(&mut self) {
        if self.is_empty() {
            return;
        }
        // SAFETY: a non-empty region was allocated with exactly this layout,
        // which was validated in `allocate`.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.len, REGION_ALIGN);
            alloc::dealloc(self.ptr.as_ptr(), layout);
        }
        trace!(size = self.len, "released foreign region");
    }
}

impl Default for ForeignRegion {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ForeignRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignRegion")
            .field("base", &self.as_ptr())
            .field("len", &self.len)
            .finish()
    }
}
