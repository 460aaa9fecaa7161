//! 位姿更新记录
//!
//! Unity 每行 JSON 对象解码后的结果。字段按原样保留为 `serde_json::Value`，
//! 数值解析和单位推断推迟到翻译阶段，这样单个字段损坏只影响对应的命令。

use serde_json::{Map, Value};

pub const FIELD_SEQ: &str = "seq";
pub const FIELD_TIMESTAMP: &str = "ts";
pub const FIELD_TARGET_DEG: &str = "target_deg";
pub const FIELD_CURRENT_DEG: &str = "current_deg";
pub const FIELD_PIPER_JAW: &str = "piper_jaw";

/// 位姿更新（不可变，单周期有效）
#[derive(Debug, Clone, PartialEq)]
pub struct PoseUpdate {
    seq: i64,
    timestamp: Option<f64>,
    target_deg: Option<Vec<Value>>,
    current_deg: Option<Vec<Value>>,
    piper_jaw: Option<Value>,
}

impl PoseUpdate {
    /// 从 JSON 对象构建
    ///
    /// `target_deg` / `current_deg` 只在值为数组时保留；其他字段忽略。
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let seq = coerce_seq(object.get(FIELD_SEQ));
        let timestamp = object.get(FIELD_TIMESTAMP).and_then(Value::as_f64);

        let take_array = |object: &mut Map<String, Value>, key: &str| match object.remove(key) {
            Some(Value::Array(values)) => Some(values),
            _ => None,
        };
        let target_deg = take_array(&mut object, FIELD_TARGET_DEG);
        let current_deg = take_array(&mut object, FIELD_CURRENT_DEG);
        let piper_jaw = object.remove(FIELD_PIPER_JAW);

        Self {
            seq,
            timestamp,
            target_deg,
            current_deg,
            piper_jaw,
        }
    }

    /// 序号（已强制转换为整数，缺失或非数值为 0）
    pub fn seq(&self) -> i64 {
        self.seq
    }

    /// Unity 端时间戳（秒），仅用于诊断
    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    /// 关节数组：优先 `target_deg`，其次 `current_deg`
    ///
    /// `target_deg` 存在但元素不足时不会回退到 `current_deg`。
    pub fn joint_values(&self) -> Option<&[Value]> {
        self.target_deg
            .as_deref()
            .or(self.current_deg.as_deref())
    }

    /// 夹爪开口原始值（可能不是整数）
    pub fn jaw(&self) -> Option<&Value> {
        self.piper_jaw.as_ref()
    }
}

/// 把 `seq` 字段强制转换为整数
///
/// - 整数：原值（超出 i64 的无符号数饱和）
/// - 有限浮点数：向零截断
/// - 字符串：去除首尾空白后按整数解析
/// - 其他或缺失：0
pub fn coerce_seq(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).unwrap_or(i64::MAX)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
                    .unwrap_or(0)
            }
        },
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}
