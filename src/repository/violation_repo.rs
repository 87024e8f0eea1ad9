// ==========================================
// 停车违章执法系统 - 违章记录数据仓储
// ==========================================
// 对齐: violations 表
// 红线: Repository 不含业务逻辑,升级规则由调用方以闭包传入
// 红线: 只追加,不提供更新/删除
// ==========================================

mod core;
mod queries;


pub use core::SqliteViolationRepository;

use crate::domain::violation::{Escalation, NewCitation, ViolationRecord};
use crate::repository::error::RepositoryResult;

/// 升级计算回调: 输入该车牌最近一条记录(若有),输出新记录的升级结果
///
/// 返回 Err 时本次追加中止,不写入任何记录。
pub type EscalateFn<'a> = &'a dyn Fn(Option<&ViolationRecord>) -> RepositoryResult<Escalation>;

// ==========================================
// ViolationStore - 违章记录存储接口
// ==========================================
// 多种存储后端共用同一套升级逻辑
pub trait ViolationStore: Send + Sync {
    /// 查询车牌最近一条记录（按插入顺序,ID 最大者）
    fn find_latest(&self, plate: &str) -> RepositoryResult<Option<ViolationRecord>>;

    /// 查询车牌全部记录（last_seen 倒序,同一时间戳 ID 大者在前）
    fn list_by_plate(&self, plate: &str) -> RepositoryResult<Vec<ViolationRecord>>;

    /// 原子追加: 读取最近记录 → 计算升级 → 插入
    ///
    /// escalate 返回的错误原样透传。
    ///
    /// 同一车牌的并发调用必须串行,任一步失败则不留下任何记录。
    fn append_escalated(
        &self,
        citation: &NewCitation,
        escalate: EscalateFn<'_>,
    ) -> RepositoryResult<ViolationRecord>;

    /// 车牌前缀检索（去重,按车牌升序）
    fn search_plates(&self, prefix: &str, limit: usize) -> RepositoryResult<Vec<String>>;
}
