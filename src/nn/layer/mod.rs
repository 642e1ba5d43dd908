/*
 * @Author       : 老董
 * @Date         : 2026-10-10
 * @Description  : Layer 模块 - 分类头用到的基础层（仅前向）
 */

mod angle_linear;
mod avg_pool3d;
mod batch_norm3d;
mod conv3d;
mod dropout;
mod linear;

pub use angle_linear::AngleMultipleLinear;
pub use avg_pool3d::GlobalAvgPool3d;
pub use batch_norm3d::{BN_EPS, BN_MOMENTUM, BatchNorm3d};
pub use conv3d::PointwiseConv3d;
pub use dropout::Dropout;
pub use linear::Linear;
