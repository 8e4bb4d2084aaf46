//! 全局数位板信息查询
//!
//! 每次查询都是同一个套路: 分配 -> 调驱动 -> 读出 -> 释放 (drop).
//! 驱动报告的尺寸和记录不符时得到全零值, 调用方按 "不可用" 处理.

use tracing::{debug, warn};

use super::{
    InfoSource,
    consts::{
        AxisDimension, Category, ContextIndex, CursorIndex, CursorName, DeviceIndex, ExtensionIndex,
        ExtensionTag, InterfaceIndex, MAX_EXTENSIONS,
    },
};
use crate::{
    config::InfoConfig,
    error::{BridgeError, Result},
    event_model::{WtAxis, WtAxisArray},
    foreign::{self, ForeignRegion, Record},
};

/// 驱动在字符串应答里算进去的 UTF-16 结尾 NUL 的字节数
const WIDE_NUL: usize = 2;

pub struct TabletInfo<D> {
    driver: D,
    string_buffer_size: usize,
}

impl<D: InfoSource> TabletInfo<D> {
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, &InfoConfig::default())
    }

    pub fn with_config(driver: D, config: &InfoConfig) -> Self {
        Self {
            driver,
            string_buffer_size: config.string_buffer_size,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// 连同驱动报告的字节数一起返回, `0` 表示没有这一项
    fn query_sized<T: Record>(&self, category: u32, index: u32) -> Result<(usize, T)> {
        let mut region = ForeignRegion::allocate_for::<T>()?;
        let size = self.driver.info(category, index, Some(&mut region)) as usize;
        if size > region.len() {
            warn!(category, index, size, capacity = region.len(), "driver over-reported answer size");
        }
        Ok((size, foreign::read_as(&region, size)?))
    }

    fn query<T: Record>(&self, category: u32, index: u32) -> Result<T> {
        self.query_sized(category, index).map(|(_, value)| value)
    }

    fn query_string(&self, category: u32, index: u32) -> Result<String> {
        let mut region = ForeignRegion::allocate(self.string_buffer_size)?;
        let size = self.driver.info(category, index, Some(&mut region)) as usize;
        if size < 1 {
            return Err(BridgeError::NoData { category, index });
        }
        let text_len = size.saturating_sub(WIDE_NUL).min(region.len());
        foreign::read_string(&region, text_len)
    }

    /// 驱动服务有应答就是 `true`
    pub fn is_available(&self) -> bool {
        self.driver.info(0, 0, None) > 0
    }

    pub fn device_name(&self) -> Result<String> {
        self.query_string(Category::Devices.into(), DeviceIndex::Name.into())
    }

    /// 默认上下文的默认设备, `-1` 是虚拟设备
    pub fn default_device_index(&self) -> Result<i32> {
        self.query(Category::DefContext.into(), ContextIndex::Device.into())
    }

    pub fn device_axis(&self, device: i32, dimension: AxisDimension) -> Result<WtAxis> {
        self.query(Category::device(device), dimension.into())
    }

    /// 倾斜轴以及是否支持倾斜
    pub fn device_orientation(&self) -> Result<(WtAxisArray, bool)> {
        let axes: WtAxisArray =
            self.query(Category::Devices.into(), DeviceIndex::Orientation.into())?;
        Ok((axes, axes.is_supported()))
    }

    pub fn device_rotation(&self) -> Result<(WtAxisArray, bool)> {
        let axes: WtAxisArray = self.query(Category::Devices.into(), DeviceIndex::Rotation.into())?;
        Ok((axes, axes.is_supported()))
    }

    pub fn number_of_devices(&self) -> Result<u32> {
        self.query(Category::Interface.into(), InterfaceIndex::NDevices.into())
    }

    pub fn is_stylus_active(&self) -> Result<bool> {
        let active: u32 = self.query(Category::Cursors.into(), CursorIndex::Active.into())?;
        Ok(active != 0)
    }

    pub fn stylus_name(&self, cursor: CursorName) -> Result<String> {
        self.query_string(cursor.into(), CursorIndex::Name.into())
    }

    /// 法向 (或切向) 压力最大值, 不支持时为 `0`
    pub fn max_pressure(&self, normal: bool) -> Result<i32> {
        let index = if normal {
            DeviceIndex::NPressure
        } else {
            DeviceIndex::TPressure
        };
        let axis: WtAxis = self.query(Category::Devices.into(), index.into())?;
        debug!(normal, max = axis.max, "pressure range");
        Ok(axis.max)
    }

    pub fn tablet_axis(&self, dimension: AxisDimension) -> Result<WtAxis> {
        self.query(Category::Devices.into(), dimension.into())
    }

    /// 扩展 `tag` 在包数据里占的位掩码, 驱动没有这个扩展时为 `0`
    ///
    /// 扩展类别从 `Category::Extensions` 开始连续编号, 第一个读不到标签的
    /// 类别就是结尾.
    pub fn extension_mask(&self, tag: ExtensionTag) -> Result<u32> {
        let wanted = u32::from(tag);
        for offset in 0..MAX_EXTENSIONS {
            let category = u32::from(Category::Extensions) + offset;
            let (size, found): (usize, u32) = self.query_sized(category, ExtensionIndex::Tag.into())?;
            if size == 0 {
                break;
            }
            if found == wanted {
                return self.query(category, ExtensionIndex::Mask.into());
            }
        }
        debug!(?tag, "extension not reported by driver");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tablet_driver::fake::FakeDriver;

    fn wide_with_nul(text: &str) -> Vec<u8> {
        text.encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect()
    }

    fn axis(min: i32, max: i32, resolution: u32) -> WtAxis {
        WtAxis {
            min,
            max,
            units: 2,
            resolution,
        }
    }

    #[test]
    fn availability_follows_driver_answer() {
        assert!(!TabletInfo::new(FakeDriver::default()).is_available());

        let driver = FakeDriver::default().answer(0, 0, vec![1]);
        assert!(TabletInfo::new(driver).is_available());
    }

    #[test]
    fn device_name_strips_terminator() {
        let driver = FakeDriver::default().answer(100, 1, wide_with_nul("Wacom Intuos"));
        let info = TabletInfo::new(driver);
        assert_eq!(info.device_name().unwrap(), "Wacom Intuos");
    }

    #[test]
    fn missing_device_name_is_no_data() {
        let info = TabletInfo::new(FakeDriver::default());
        let err = info.device_name().unwrap_err();
        assert!(matches!(err, BridgeError::NoData { category: 100, index: 1 }));
    }

    #[test]
    fn terminator_only_name_is_invalid() {
        let driver = FakeDriver::default().answer(200, 1, vec![0, 0]);
        let err = TabletInfo::new(driver)
            .stylus_name(CursorName::Puck)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }

    #[test]
    fn stylus_names_use_cursor_categories() {
        let driver = FakeDriver::default()
            .answer(201, 1, wide_with_nul("Pressure Stylus"))
            .answer(202, 1, wide_with_nul("Eraser"));
        let info = TabletInfo::new(driver);
        assert_eq!(
            info.stylus_name(CursorName::PressureStylus).unwrap(),
            "Pressure Stylus"
        );
        assert_eq!(info.stylus_name(CursorName::Eraser).unwrap(), "Eraser");
    }

    #[test]
    fn long_name_is_bounded_by_buffer() {
        let name = "x".repeat(300);
        let driver = FakeDriver::default().answer(100, 1, wide_with_nul(&name));
        let info = TabletInfo::with_config(driver, &InfoConfig { string_buffer_size: 64 });
        assert_eq!(info.device_name().unwrap(), "x".repeat(32));
    }

    #[test]
    fn scalar_queries() {
        let driver = FakeDriver::default()
            .answer_record(1, 4, &2u32)
            .answer_record(3, 6, &-1i32)
            .answer_record(200, 2, &1u32);
        let info = TabletInfo::new(driver);
        assert_eq!(info.number_of_devices().unwrap(), 2);
        assert_eq!(info.default_device_index().unwrap(), -1);
        assert!(info.is_stylus_active().unwrap());
    }

    #[test]
    fn unsupported_queries_degrade_to_zero() {
        let info = TabletInfo::new(FakeDriver::default());
        assert_eq!(info.number_of_devices().unwrap(), 0);
        assert_eq!(info.max_pressure(false).unwrap(), 0);
        assert_eq!(info.tablet_axis(AxisDimension::Z).unwrap(), WtAxis::default());
        assert!(!info.is_stylus_active().unwrap());

        let (axes, tilt) = info.device_orientation().unwrap();
        assert_eq!(axes, WtAxisArray::default());
        assert!(!tilt);
    }

    #[test]
    fn axes_and_pressure() {
        let driver = FakeDriver::default()
            .answer_record(99, 12, &axis(0, 15200, 2540))
            .answer_record(100, 13, &axis(0, 9500, 2540))
            .answer_record(100, 15, &axis(0, 8191, 0));
        let info = TabletInfo::new(driver);

        assert_eq!(info.device_axis(-1, AxisDimension::X).unwrap().max, 15200);
        assert_eq!(info.tablet_axis(AxisDimension::Y).unwrap().max, 9500);
        assert_eq!(info.max_pressure(true).unwrap(), 8191);
    }

    #[test]
    fn orientation_support_flag() {
        let axes = WtAxisArray {
            axes: [axis(0, 3600, 1 << 16), axis(-900, 900, 1 << 16), axis(0, 0, 0)],
        };
        let driver = FakeDriver::default().answer_record(100, 17, &axes);
        let (read, tilt) = TabletInfo::new(driver).device_orientation().unwrap();
        assert_eq!(read, axes);
        assert!(tilt);
    }

    #[test]
    fn misreported_size_degrades_to_zero() {
        let driver = FakeDriver::default()
            .answer_record(100, 18, &WtAxisArray {
                axes: [axis(1, 2, 3); 3],
            })
            .report(100, 18, 32);
        let (axes, supported) = TabletInfo::new(driver).device_rotation().unwrap();
        assert_eq!(axes, WtAxisArray::default());
        assert!(!supported);
    }

    #[test]
    fn extension_mask_walks_extension_categories() {
        let driver = FakeDriver::default()
            .answer_record(300, 2, &u32::from(ExtensionTag::FunctionKeys))
            .answer_record(300, 3, &0x0100u32)
            .answer_record(301, 2, &u32::from(ExtensionTag::TouchStrip))
            .answer_record(301, 3, &0x0800u32);
        let info = TabletInfo::new(driver);

        assert_eq!(info.extension_mask(ExtensionTag::TouchStrip).unwrap(), 0x0800);
        assert_eq!(info.extension_mask(ExtensionTag::FunctionKeys).unwrap(), 0x0100);
    }

    #[test]
    fn missing_extension_mask_is_zero() {
        let driver = FakeDriver::default()
            .answer_record(300, 2, &u32::from(ExtensionTag::ExpressKeys))
            .answer_record(300, 3, &0x0400u32);
        let info = TabletInfo::new(driver);

        assert_eq!(info.extension_mask(ExtensionTag::TouchRing).unwrap(), 0);
        assert_eq!(info.extension_mask(ExtensionTag::OutOfBoundsTracking).unwrap(), 0);
        assert_eq!(TabletInfo::new(FakeDriver::default()).extension_mask(ExtensionTag::Tilt).unwrap(), 0);
    }

    #[test]
    fn zero_valued_tag_is_still_found() {
        let driver = FakeDriver::default()
            .answer_record(300, 2, &u32::from(ExtensionTag::OutOfBoundsTracking))
            .answer_record(300, 3, &0x0010u32);
        let info = TabletInfo::new(driver);
        assert_eq!(info.extension_mask(ExtensionTag::OutOfBoundsTracking).unwrap(), 0x0010);
    }
}
