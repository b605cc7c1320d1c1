// ==========================================
// 教务注册系统 - 先修课资格判定
// ==========================================
// 规则: 条目带先修课时，学生须在任一学期有该课程的
//       passed / completed 选课记录
// ==========================================

use crate::domain::prospectus::ProspectusEntry;
use crate::domain::student::StudentLoadView;
use std::collections::HashSet;

/// 学生已满足的先修课集合
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteIndex {
    satisfied: HashSet<i64>,
}

impl PrerequisiteIndex {
    pub fn from_loads(loads: &[StudentLoadView]) -> Self {
        Self {
            satisfied: loads
                .iter()
                .filter(|l| l.status.satisfies_prerequisite())
                .map(|l| l.subject_id)
                .collect(),
        }
    }

    pub fn is_satisfied(&self, subject_id: i64) -> bool {
        self.satisfied.contains(&subject_id)
    }

    pub fn is_eligible(&self, entry: &ProspectusEntry) -> bool {
        entry
            .prerequisite_id
            .map_or(true, |prereq| self.is_satisfied(prereq))
    }
}

/// 按先修课拆分条目
///
/// # 返回
/// (可选条目, 被先修课阻塞的条目)；enforce = false 时全部可选
pub fn partition_by_prerequisite<'a>(
    entries: Vec<&'a ProspectusEntry>,
    loads: &[StudentLoadView],
    enforce: bool,
) -> (Vec<&'a ProspectusEntry>, Vec<&'a ProspectusEntry>) {
    if !enforce {
        return (entries, Vec::new());
    }
    let index = PrerequisiteIndex::from_loads(loads);
    entries.into_iter().partition(|e| index.is_eligible(e))
}
