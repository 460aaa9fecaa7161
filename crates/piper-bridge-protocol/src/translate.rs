//! 位姿更新 → 执行器命令
//!
//! # 单位推断
//!
//! Unity 端既可能发送弧度也可能发送角度，协议里没有单位标记。
//! 这里沿用按幅值推断的规则：六个关节中最大绝对值 ≤ 3.2 视为弧度，
//! 否则视为角度。两种情况都换算到设备单位 0.001°：
//!
//! | 推断   | 系数          | 含义                    |
//! |--------|---------------|-------------------------|
//! | 弧度   | `57295.7795`  | rad → ° (57.29578) ×1000 |
//! | 角度   | `1000.0`      | ° ×1000                 |
//!
//! ⚠️ 这是启发式规则：当所有关节都在 ±3.2° 以内时，角度输入会被误判为弧度
//! （放大约 57 倍）；阈值和系数都放在 [`TranslatorConfig`] 中。

use crate::command::{CommandSet, GripperCommand, JOINT_COUNT, JointCommand};
use crate::pose::PoseUpdate;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

/// 弧度/角度判定阈值
pub const RADIAN_THRESHOLD: f64 = 3.2;

/// 弧度 → 0.001°
pub const RADIAN_SCALE: f64 = 57295.7795;

/// 角度 → 0.001°
pub const DEGREE_SCALE: f64 = 1000.0;

/// 夹爪固定力矩（0.001N·m）
pub const DEFAULT_GRIPPER_EFFORT: i16 = 1000;

/// 推断出的输入单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitGuess {
    Radians,
    Degrees,
}

/// 翻译参数
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct TranslatorConfig {
    /// 最大绝对值不超过该阈值时按弧度处理
    pub radian_threshold: f64,
    /// 弧度输入的缩放系数
    pub radian_scale: f64,
    /// 角度输入的缩放系数
    pub degree_scale: f64,
    /// 夹爪命令携带的固定力矩
    pub gripper_effort: i16,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            radian_threshold: RADIAN_THRESHOLD,
            radian_scale: RADIAN_SCALE,
            degree_scale: DEGREE_SCALE,
            gripper_effort: DEFAULT_GRIPPER_EFFORT,
        }
    }
}

impl TranslatorConfig {
    /// 根据最大绝对值推断单位
    pub fn guess_units(&self, max_abs: f64) -> UnitGuess {
        if max_abs <= self.radian_threshold {
            UnitGuess::Radians
        } else {
            UnitGuess::Degrees
        }
    }

    /// 推断单位对应的缩放系数
    pub fn scale_for(&self, units: UnitGuess) -> f64 {
        match units {
            UnitGuess::Radians => self.radian_scale,
            UnitGuess::Degrees => self.degree_scale,
        }
    }
}

/// 翻译失败的原因
///
/// 所有变体都只意味着“本周期不发该命令”，不会中断会话。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("update carries no joint array")]
    MissingJoints,

    #[error("joint array has {found} elements, need 6")]
    TooFewJoints { found: usize },

    #[error("joint {index} is not a number")]
    NonNumericJoint { index: usize },

    #[error("joint {index} is not finite")]
    NonFiniteJoint { index: usize },

    #[error("joint {index} does not fit the device range after scaling")]
    JointOutOfRange { index: usize },

    #[error("update carries no gripper aperture")]
    MissingJaw,

    #[error("gripper aperture is not an integer")]
    NonIntegerJaw,

    #[error("gripper aperture does not fit the device range")]
    JawOutOfRange,
}

impl TranslateError {
    /// 字段缺失（正常情况，仅 trace 级别日志）
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            TranslateError::MissingJoints | TranslateError::MissingJaw
        )
    }
}

/// 命令翻译器
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTranslator {
    config: TranslatorConfig,
}

impl CommandTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// 关节翻译
    pub fn translate_joints(&self, update: &PoseUpdate) -> Result<JointCommand, TranslateError> {
        let values = update.joint_values().ok_or(TranslateError::MissingJoints)?;
        if values.len() < JOINT_COUNT {
            return Err(TranslateError::TooFewJoints {
                found: values.len(),
            });
        }

        let mut parsed = [0.0f64; JOINT_COUNT];
        for (index, (slot, value)) in parsed.iter_mut().zip(values).enumerate() {
            let v = parse_f64(value).ok_or(TranslateError::NonNumericJoint { index })?;
            if !v.is_finite() {
                return Err(TranslateError::NonFiniteJoint { index });
            }
            *slot = v;
        }

        let max_abs = parsed.iter().map(|v| v.abs()).fold(0.0_f64, f64::max);
        let units = self.config.guess_units(max_abs);
        let scale = self.config.scale_for(units);

        let mut joints = [0i32; JOINT_COUNT];
        for (index, (out, v)) in joints.iter_mut().zip(parsed).enumerate() {
            *out = to_device_units(v * scale).ok_or(TranslateError::JointOutOfRange { index })?;
        }

        trace!(
            "seq {} joints {:?} (max_abs={:.4}, {:?})",
            update.seq(),
            joints,
            max_abs,
            units
        );
        Ok(JointCommand::new(joints))
    }

    /// 夹爪翻译
    ///
    /// 负值钳位为 0（负的开口宽度没有意义，不取绝对值）。
    pub fn translate_gripper(&self, update: &PoseUpdate) -> Result<GripperCommand, TranslateError> {
        let raw = update.jaw().ok_or(TranslateError::MissingJaw)?;
        let aperture = parse_i64(raw).ok_or(TranslateError::NonIntegerJaw)?.max(0);
        let aperture = i32::try_from(aperture).map_err(|_| TranslateError::JawOutOfRange)?;

        Ok(GripperCommand::enabled(aperture, self.config.gripper_effort))
    }

    /// 同时尝试关节和夹爪翻译
    pub fn translate(&self, update: &PoseUpdate) -> CommandSet {
        CommandSet {
            joints: self
                .translate_joints(update)
                .map_err(|e| log_skipped("joint", update, &e))
                .ok(),
            gripper: self
                .translate_gripper(update)
                .map_err(|e| log_skipped("gripper", update, &e))
                .ok(),
        }
    }
}

fn log_skipped(kind: &str, update: &PoseUpdate, error: &TranslateError) {
    if error.is_absent() {
        trace!("seq {}: no {} command: {}", update.seq(), kind, error);
    } else {
        debug!("seq {}: dropping {} command: {}", update.seq(), kind, error);
    }
}

/// 四舍五入（ties-to-even）并检查 i32 范围
fn to_device_units(scaled: f64) -> Option<i32> {
    let rounded = scaled.round_ties_even();
    if rounded.is_finite() && rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64 {
        Some(rounded as i32)
    } else {
        None
    }
}

/// JSON 数字或数字字符串 → f64
fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// JSON 整数、有限浮点（向零截断）或整数字符串 → i64
fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            if n.is_u64() {
                Some(i64::MAX)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
