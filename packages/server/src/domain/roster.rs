//! Domain Model: 接続中クライアントの名簿
//!
//! 接続は番号で識別され、`join` を受け取るまでは名前を持たない。
//! 名前を持つ接続だけがチャットの参加者として扱われる。

use std::collections::BTreeMap;

use thiserror::Error;

/// Server-side identifier of one WebSocket connection
pub type ConnectionId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("Connection {0} has already joined")]
    AlreadyJoined(ConnectionId),

    #[error("Connection {0} has not joined yet")]
    NotJoined(ConnectionId),

    #[error("Display name must not be empty")]
    EmptyName,
}

/// Connected clients and their display names
#[derive(Debug, Default)]
pub struct Roster {
    next_id: ConnectionId,
    members: BTreeMap<ConnectionId, Option<String>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい接続を名前なしで登録し、その番号を返す
    pub fn add_connection(&mut self) -> ConnectionId {
        self.next_id += 1;
        self.members.insert(self.next_id, None);
        self.next_id
    }

    /// 接続を削除する
    ///
    /// 戻り値は削除された接続の名前（未参加なら `None`）。
    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<Option<String>, RosterError> {
        self.members
            .remove(&id)
            .ok_or(RosterError::UnknownConnection(id))
    }

    /// 接続に表示名を付ける。最初の join だけが有効
    pub fn assign_name(&mut self, id: ConnectionId, name: &str) -> Result<String, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }

        let slot = self
            .members
            .get_mut(&id)
            .ok_or(RosterError::UnknownConnection(id))?;
        if slot.is_some() {
            return Err(RosterError::AlreadyJoined(id));
        }
        *slot = Some(name.to_string());
        Ok(name.to_string())
    }

    /// 参加済み接続の名前を返す
    pub fn name_of(&self, id: ConnectionId) -> Result<&str, RosterError> {
        match self.members.get(&id) {
            Some(Some(name)) => Ok(name),
            Some(None) => Err(RosterError::NotJoined(id)),
            None => Err(RosterError::UnknownConnection(id)),
        }
    }

    /// 参加済みユーザー名の一覧（名前順）
    pub fn user_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.values().flatten().cloned().collect();
        names.sort();
        names
    }

    /// 参加済みの全接続
    pub fn joined_connections(&self) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|(_, name)| name.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// 指定した接続以外の参加済み接続
    pub fn joined_connections_except(&self, exclude: ConnectionId) -> Vec<ConnectionId> {
        self.joined_connections()
            .into_iter()
            .filter(|id| *id != exclude)
            .collect()
    }

    pub fn connection_count(&self) -> usize {
        self.members.len()
    }
}
