/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-14 10:02:41
 * @Description  : 负责神经网络（neural network）分类头的构建
 */

mod context;
pub(crate) mod error;
pub mod head;
mod init;
pub mod layer;
pub mod loss;
mod module;
pub mod sphere;

pub use context::{Context, NoGradScope};
pub use error::HeadError;
pub use head::{ClsHead, HeadConfig, HeadOutput, SlowFastHead, SlowFastHeadConfig};
pub use init::Init;
pub use module::Module;

#[cfg(test)]
mod tests;
