//! 草稿/生效参数状态机
//!
//! 每次用户操作对应一个 `Intent`，由纯函数 `reduce` 计算新的状态。
//! 草稿的修改不会影响生效参数，只有“应用”成功后才整体覆盖。

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{CandleColor, Draft, Market, Parameters, MAX_DAYS, MIN_DAYS};
use crate::services::mav::parse_mav;

/// 单个会话的仪表盘状态
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardState {
    /// 未应用的编辑
    pub draft: Draft,
    /// 当前生效参数
    pub params: Parameters,
}

impl DashboardState {
    /// 首次加载时将生效参数的选中标签设为默认市场代码表的第一项
    pub fn ensure_selected(&mut self, labels: &[String]) {
        if self.params.selected_label.is_none() {
            self.params.selected_label = labels.first().cloned();
        }
    }
}

/// 用户操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Intent {
    SetMarket(Market),
    SetSymbol(String),
    SetDays(u32),
    SetUpColor(CandleColor),
    SetDownColor(CandleColor),
    SetShowVolume(bool),
    SetMavText(String),
    /// 用草稿市场的代码表校正草稿中的选中标签
    ResolveSymbol { labels: Vec<String> },
    Apply,
}

/// 操作结果提示
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum Notice {
    Applied,
    Rejected(ValidationError),
}

/// `reduce` 的返回值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub state: DashboardState,
    pub notice: Option<Notice>,
}

impl Update {
    fn quiet(state: DashboardState) -> Self {
        Self { state, notice: None }
    }
}

/// 状态机转换
pub fn reduce(mut state: DashboardState, intent: Intent) -> Update {
    let draft = &mut state.draft;

    match intent {
        Intent::SetMarket(market) => draft.market = market,
        Intent::SetSymbol(label) => draft.selected_label = Some(label),
        Intent::SetDays(days) => {
            if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
                return Update {
                    state,
                    notice: Some(Notice::Rejected(ValidationError::LookbackOutOfRange)),
                };
            }
            draft.days = days;
        }
        Intent::SetUpColor(color) => draft.up_color = color,
        Intent::SetDownColor(color) => draft.down_color = color,
        Intent::SetShowVolume(show) => draft.show_volume = show,
        Intent::SetMavText(text) => draft.mav_text = text,
        Intent::ResolveSymbol { labels } => {
            let present = draft
                .selected_label
                .as_ref()
                .is_some_and(|label| labels.contains(label));
            if !present {
                draft.selected_label = labels.into_iter().next();
            }
        }
        Intent::Apply => return apply(state),
    }

    Update::quiet(state)
}

fn apply(state: DashboardState) -> Update {
    let mav = match parse_mav(&state.draft.mav_text) {
        Ok(mav) => mav,
        Err(err) => {
            log::info!("应用参数失败: {}", err);
            return Update {
                state,
                notice: Some(Notice::Rejected(err)),
            };
        }
    };

    let draft = Draft {
        mav,
        ..state.draft
    };
    let params = draft.to_params();

    Update {
        state: DashboardState { draft, params },
        notice: Some(Notice::Applied),
    }
}

/// 会话存储
///
/// 会话之间互相隔离，同一会话的状态在一次请求内读取、计算并写回。
/// 空闲超过 `idle` 的会话会被淘汰。
pub struct SessionStore {
    sessions: Cache<Uuid, DashboardState>,
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// 读取会话状态，不存在或已过期时返回默认状态
    pub async fn load(&self, id: &Uuid) -> DashboardState {
        self.sessions.get(id).await.unwrap_or_default()
    }

    pub async fn save(&self, id: Uuid, state: DashboardState) {
        self.sessions.insert(id, state).await;
    }

    /// 当前未过期的会话数
    pub async fn len(&self) -> usize {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn edit(state: DashboardState, intents: Vec<Intent>) -> DashboardState {
        intents
            .into_iter()
            .fold(state, |state, intent| reduce(state, intent).state)
    }

    #[test]
    fn test_default_state() {
        let state = DashboardState::default();
        assert_eq!(state.params.market, Market::Kospi);
        assert_eq!(state.params.days, 365);
        assert_eq!(state.params.up_color, CandleColor::Blue);
        assert_eq!(state.params.down_color, CandleColor::Pink);
        assert!(state.params.show_volume);
        assert!(state.params.mav.is_empty());
        assert!(state.params.selected_label.is_none());
    }

    #[test]
    fn test_ensure_selected_only_once() {
        let mut state = DashboardState::default();
        state.ensure_selected(&labels(&["A (1)", "B (2)"]));
        assert_eq!(state.params.selected_label.as_deref(), Some("A (1)"));

        state.ensure_selected(&labels(&["B (2)"]));
        assert_eq!(state.params.selected_label.as_deref(), Some("A (1)"));
    }

    #[test]
    fn test_draft_isolation() {
        println!("\n========== 测试草稿隔离 ==========");
        let before = DashboardState::default();
        let after = edit(
            before.clone(),
            vec![
                Intent::SetMarket(Market::Kosdaq),
                Intent::SetSymbol("X (9)".to_string()),
                Intent::SetDays(30),
                Intent::SetUpColor(CandleColor::Red),
                Intent::SetDownColor(CandleColor::Blue),
                Intent::SetShowVolume(false),
                Intent::SetMavText("5,20".to_string()),
            ],
        );

        assert_eq!(after.params, before.params);
        assert_eq!(after.draft.market, Market::Kosdaq);
        assert_eq!(after.draft.days, 30);
        assert_eq!(after.draft.mav_text, "5,20");
        // 解析只在应用时发生
        assert!(after.draft.mav.is_empty());
        println!("✅ 草稿隔离测试通过！");
    }

    #[test]
    fn test_apply_commits_full_draft() {
        let state = edit(
            DashboardState::default(),
            vec![
                Intent::SetMarket(Market::Kosdaq),
                Intent::SetSymbol("X (9)".to_string()),
                Intent::SetDays(30),
                Intent::SetShowVolume(false),
                Intent::SetMavText("20 5 5".to_string()),
            ],
        );

        let update = reduce(state, Intent::Apply);
        assert_eq!(update.notice, Some(Notice::Applied));

        let params = &update.state.params;
        assert_eq!(params.market, Market::Kosdaq);
        assert_eq!(params.selected_label.as_deref(), Some("X (9)"));
        assert_eq!(params.days, 30);
        assert!(!params.show_volume);
        assert_eq!(params.mav, vec![5, 20]);
        assert_eq!(update.state.draft.mav, vec![5, 20]);
        assert_eq!(update.state.draft.mav_text, "20 5 5");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let state = edit(
            DashboardState::default(),
            vec![Intent::SetDays(90), Intent::SetMavText("7,14".to_string())],
        );

        let first = reduce(state, Intent::Apply).state;
        let second = reduce(first.clone(), Intent::Apply).state;
        assert_eq!(first.params, second.params);
        assert_eq!(first, second);
    }

    #[test]
    fn test_apply_aborts_on_invalid_mav() {
        println!("\n========== 测试应用失败不提交 ==========");
        let applied = reduce(
            edit(
                DashboardState::default(),
                vec![Intent::SetMavText("7".to_string())],
            ),
            Intent::Apply,
        )
        .state;

        let edited = edit(
            applied.clone(),
            vec![Intent::SetDays(60), Intent::SetMavText("1, 5".to_string())],
        );
        let update = reduce(edited.clone(), Intent::Apply);

        assert_eq!(
            update.notice,
            Some(Notice::Rejected(ValidationError::PeriodTooSmall))
        );
        assert_eq!(update.state.params, applied.params);
        assert_eq!(update.state.draft, edited.draft);
        assert_eq!(
            serde_json::to_vec(&update.state.params).unwrap(),
            serde_json::to_vec(&applied.params).unwrap()
        );

        let update = reduce(
            edit(edited, vec![Intent::SetMavText("abc".to_string())]),
            Intent::Apply,
        );
        assert_eq!(
            update.notice,
            Some(Notice::Rejected(ValidationError::NotAnInteger))
        );
        println!("✅ 应用失败不提交测试通过！");
    }

    #[test]
    fn test_days_out_of_range_rejected() {
        let state = DashboardState::default();
        for days in [0, 4, 3651] {
            let update = reduce(state.clone(), Intent::SetDays(days));
            assert_eq!(
                update.notice,
                Some(Notice::Rejected(ValidationError::LookbackOutOfRange))
            );
            assert_eq!(update.state, state);
        }
        let update = reduce(state, Intent::SetDays(3650));
        assert_eq!(update.notice, None);
        assert_eq!(update.state.draft.days, 3650);
    }

    #[test]
    fn test_resolve_symbol_after_market_change() {
        println!("\n========== 测试切换市场后重新选择股票 ==========");
        let kospi = labels(&["Samsung Electronics (005930)", "SK hynix (000660)"]);
        let kosdaq = labels(&["EcoPro BM (247540)", "Alteogen (196170)"]);

        let state = edit(
            DashboardState::default(),
            vec![
                Intent::ResolveSymbol { labels: kospi.clone() },
                Intent::SetSymbol("SK hynix (000660)".to_string()),
                Intent::ResolveSymbol { labels: kospi },
            ],
        );
        assert_eq!(state.draft.selected_label.as_deref(), Some("SK hynix (000660)"));

        let state = edit(
            state,
            vec![
                Intent::SetMarket(Market::Kosdaq),
                Intent::ResolveSymbol { labels: kosdaq.clone() },
            ],
        );
        assert_eq!(state.draft.selected_label, Some(kosdaq[0].clone()));

        let state = edit(state, vec![Intent::ResolveSymbol { labels: vec![] }]);
        assert_eq!(state.draft.selected_label, None);
        println!("✅ 重新选择股票测试通过！");
    }

    #[test]
    fn test_intent_json_shape() {
        let intent: Intent =
            serde_json::from_str(r#"{"type":"set_market","value":"KOSDAQ"}"#).unwrap();
        assert_eq!(intent, Intent::SetMarket(Market::Kosdaq));

        let intent: Intent = serde_json::from_str(r#"{"type":"apply"}"#).unwrap();
        assert_eq!(intent, Intent::Apply);

        let intent: Intent =
            serde_json::from_str(r#"{"type":"set_mav_text","value":"5,20"}"#).unwrap();
        assert_eq!(intent, Intent::SetMavText("5,20".to_string()));
    }

    #[tokio::test]
    async fn test_session_store_isolation() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let state = reduce(store.load(&a).await, Intent::SetDays(30)).state;
        store.save(a, state).await;

        assert_eq!(store.load(&a).await.draft.days, 30);
        assert_eq!(store.load(&b).await.draft.days, 365);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        println!("\n========== 测试空闲会话过期 ==========");
        let store = SessionStore::new(Duration::from_millis(100));
        let id = Uuid::new_v4();

        let state = reduce(store.load(&id).await, Intent::SetDays(30)).state;
        store.save(id, state).await;
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.load(&id).await, DashboardState::default());
        assert_eq!(store.len().await, 0);
        println!("✅ 空闲会话过期测试通过！");
    }
}
