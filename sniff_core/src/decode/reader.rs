//! 带边界检查的字段读取。
//!
//! 所有头部解析都先通过 [`fixed`] 取出一个定长数组引用，之后的字段读取
//! 都落在这个数组内，不会越过原始缓冲区的 `[0, len)`。

/// 在 `offset` 处取出 `N` 字节的定长视图，越界时返回 `None`
#[inline]
pub(crate) fn fixed<const N: usize>(bytes: &[u8], offset: usize) -> Option<&[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}

/// `offset` 之后剩余的字节数
#[inline]
pub(crate) fn remaining(bytes: &[u8], offset: usize) -> usize {
    bytes.len().saturating_sub(offset)
}

#[inline]
pub(crate) fn be_u16(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

#[inline]
pub(crate) fn be_u32(b0: u8, b1: u8, b2: u8, b3: u8) -> u32 {
    u32::from_be_bytes([b0, b1, b2, b3])
}
