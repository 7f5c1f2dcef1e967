//! 恢复协议状态机 - 纯转移函数，不碰存储和网络
//!
//! 状态机输入是已分类的差量响应，输出是效果列表（持久化游标 / 发射事件），
//! 由 engine 执行效果。这样协议逻辑无需真实远端即可测试。
//!
//! 四种响应形态的游标语义：
//! - Empty   ：持久化（pts 不变，date/seq 取响应值），终态 Done
//! - TooLong ：持久化服务端给的权威 pts（date/seq 沿用本地），继续查询；
//!             注意内存工作 pts 故意不更新，下一次查询仍用旧 pts（见下）
//! - Full    ：工作游标取响应终态，发射全部新消息，继续查询
//! - Slice   ：工作游标取中间态；若与上一片 pts 相同判定服务端不再推进，
//!             直接终态 NoProgress（不持久化、不发射本片事件）
//!
//! ## NOTE: TooLong 分支不回写工作 pts
//!
//! 上游参考实现持久化 diff.pts 但继续用旧 pts 重发查询。行为由测试钉死；
//! 改动前需产品侧确认（见 DESIGN.md）。

use gramsync_protocol::{Chat, Difference, GetDifference, Message, UpdatesState, User};

use crate::storage::entities::UpdateState;

/// 单次差量查询允许覆盖的最大 pts 跨度
pub const PTS_TOTAL_LIMIT: i64 = 1_000_000;

/// 协议阶段；Querying 之外皆为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Querying,
    Done,
    Aborted,
    NoProgress,
}

/// 状态机产出的效果，由驱动方执行
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryEffect {
    /// 持久化游标（写失败须向上抛，不得当作已保存）
    PersistState {
        pts: i64,
        date: Option<i64>,
        qts: Option<i64>,
        seq: Option<i64>,
    },
    /// 发射本响应的全部新消息（pts_count 哨兵 -1 由执行方补上）
    EmitNewMessages {
        pts: i64,
        messages: Vec<Message>,
        users: Vec<User>,
        chats: Vec<Chat>,
    },
}

/// 一次恢复调用的工作状态
#[derive(Debug)]
pub struct RecoveryLoop {
    pts: i64,
    date: i64,
    seq: Option<i64>,
    /// 上一个 Slice 的中间 pts；0 为"尚未见过中间态"哨兵
    prev_pts: i64,
    message_count: usize,
    other_count: usize,
    phase: Phase,
}

impl RecoveryLoop {
    pub fn new(state: &UpdateState) -> Self {
        Self {
            pts: state.pts,
            date: state.date,
            seq: state.seq,
            prev_pts: 0,
            message_count: 0,
            other_count: 0,
            phase: Phase::Querying,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn other_count(&self) -> usize {
        self.other_count
    }

    /// 下一次差量查询的参数
    pub fn query(&self) -> GetDifference {
        GetDifference {
            pts: self.pts,
            date: self.date,
            qts: 0,
            pts_total_limit: PTS_TOTAL_LIMIT,
        }
    }

    /// 远端调用失败：终态 Aborted，无效果（不写游标）
    pub fn on_rpc_error(&mut self) {
        self.phase = Phase::Aborted;
    }

    /// 纯转移函数：吃一个已分类响应，返回待执行效果
    ///
    /// 终态下的响应一律忽略（无效果、不改相位），误用不会破坏状态机。
    pub fn on_response(&mut self, diff: Difference) -> Vec<RecoveryEffect> {
        if self.phase != Phase::Querying {
            return vec![];
        }
        match diff {
            Difference::Empty { date, seq } => {
                self.phase = Phase::Done;
                vec![RecoveryEffect::PersistState {
                    pts: self.pts,
                    date: Some(date),
                    qts: None,
                    seq: Some(seq),
                }]
            }
            Difference::TooLong { pts } => {
                // 持久化权威 pts，但工作 pts 保持不变（见模块文档）
                vec![RecoveryEffect::PersistState {
                    pts,
                    date: Some(self.date),
                    qts: None,
                    seq: self.seq,
                }]
            }
            Difference::Full { state, new_messages, users, chats } => {
                self.advance_to(state);
                vec![self.emit(new_messages, users, chats)]
            }
            Difference::Slice { intermediate_state, new_messages, users, chats } => {
                self.advance_to(intermediate_state);
                if self.prev_pts == self.pts {
                    // 服务端原地踏步：终止，本片事件不发射，游标不持久化
                    self.phase = Phase::NoProgress;
                    return vec![];
                }
                self.prev_pts = self.pts;
                vec![self.emit(new_messages, users, chats)]
            }
        }
    }

    fn advance_to(&mut self, state: UpdatesState) {
        self.pts = state.pts;
        self.date = state.date;
        self.seq = Some(state.seq);
    }

    fn emit(
        &mut self,
        messages: Vec<Message>,
        users: Vec<User>,
        chats: Vec<Chat>,
    ) -> RecoveryEffect {
        self.message_count += messages.len();
        RecoveryEffect::EmitNewMessages {
            pts: self.pts,
            messages,
            users,
            chats,
        }
    }
}
