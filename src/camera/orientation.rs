//! # 方向校正
//!
//! 把像素缓冲重绘成方向标记所声明的“正向”，并把标记改为 `Up`。
//! 已是正向的位图原样返回（不重绘、不复制）。
//!
//! 变换表（EXIF 1..=8）：
//!
//! ```text
//! 1 Up            -> 原样
//! 2 UpMirrored    -> 水平镜像
//! 3 Down          -> 旋转 180°
//! 4 DownMirrored  -> 垂直镜像
//! 5 LeftMirrored  -> 顺时针 90° + 水平镜像（主对角线转置）
//! 6 Right         -> 顺时针 90°
//! 7 RightMirrored -> 顺时针 270° + 水平镜像（副对角线转置）
//! 8 Left          -> 顺时针 270°
//! ```

use super::source::{Orientation, RawBitmap};

/// 校正方向，保留缩放系数。
pub fn normalize_orientation(bitmap: RawBitmap) -> RawBitmap {
    if bitmap.orientation.is_upright() {
        return bitmap;
    }

    let RawBitmap {
        image,
        orientation,
        scale,
    } = bitmap;

    let upright = match orientation {
        Orientation::Up => image,
        Orientation::UpMirrored => image.fliph(),
        Orientation::Down => image.rotate180(),
        Orientation::DownMirrored => image.flipv(),
        Orientation::LeftMirrored => image.rotate90().fliph(),
        Orientation::Right => image.rotate90(),
        Orientation::RightMirrored => image.rotate270().fliph(),
        Orientation::Left => image.rotate270(),
    };

    log::debug!(
        "🔄 方向校正：EXIF {} -> 1，输出尺寸 {}x{}",
        orientation.exif_value(),
        upright.width(),
        upright.height()
    );

    RawBitmap {
        image: upright,
        orientation: Orientation::Up,
        scale,
    }
}
