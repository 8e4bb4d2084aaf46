use tracing::debug;

use super::PacketSource;
use crate::{
    config::DataConfig,
    error::Result,
    event_model::{WtPacket, WtPacketExt},
    foreign::{self, ForeignRegion, Record},
};

/// 从驱动的包队列里取数据
pub struct TabletData<D> {
    driver: D,
    context: u32,
    max_packets: u32,
}

impl<D: PacketSource> TabletData<D> {
    pub fn new(driver: D, context: u32) -> Self {
        Self::with_config(driver, context, &DataConfig::default())
    }

    pub fn with_config(driver: D, context: u32, config: &DataConfig) -> Self {
        Self {
            driver,
            context,
            max_packets: config.max_packets,
        }
    }

    pub fn context(&self) -> u32 {
        self.context
    }

    fn packet_as<T: Record>(&self, serial: u32) -> Result<T> {
        let mut region = ForeignRegion::allocate_for::<T>()?;
        let size = if self.driver.packet(self.context, serial, &mut region) {
            T::SIZE
        } else {
            0
        };
        foreign::read_as(&region, size)
    }

    /// 序号为 `serial` 的包, 驱动已经没有时得到全零包
    pub fn packet(&self, serial: u32) -> Result<WtPacket> {
        self.packet_as(serial)
    }

    pub fn packet_ext(&self, serial: u32) -> Result<WtPacketExt> {
        self.packet_as(serial)
    }

    /// 最多 `max` 个排队的包, 旧的在前. `remove` 为真时出队, 否则留在队列里.
    /// 没有待处理的包时为空.
    pub fn packets(&self, max: u32, remove: bool) -> Result<Vec<WtPacket>> {
        let max = max.min(self.max_packets);
        if max == 0 {
            return Ok(Vec::new());
        }
        let mut region = ForeignRegion::allocate_array::<WtPacket>(max as usize)?;
        let count = if remove {
            self.driver.packets_get(self.context, max, &mut region)
        } else {
            self.driver.packets_peek(self.context, max, &mut region)
        };
        debug!(count, max, remove, "fetched packets");
        Ok(foreign::read_array(count.min(max) as usize, &region))
    }

    /// 丢掉最多 `max` 个排队的包, 返回丢掉的个数
    pub fn flush(&self, max: u32) -> u32 {
        let flushed = self
            .driver
            .packets_get(self.context, max, &mut ForeignRegion::empty());
        debug!(flushed, max, "flushed packet queue");
        flushed
    }
}
