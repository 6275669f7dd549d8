//! UseCase: 参加中ユーザーの一覧取得

use super::SharedRoster;

pub struct ListUsersUseCase {
    roster: SharedRoster,
}

impl ListUsersUseCase {
    pub fn new(roster: SharedRoster) -> Self {
        Self { roster }
    }

    /// 参加済みユーザー名を名前順で返す
    pub async fn execute(&self) -> Vec<String> {
        self.roster.lock().await.user_names()
    }
}
