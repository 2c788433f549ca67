use uuid::Uuid;

/// Kind of entity an id is generated for; decides the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Thread,
    Message,
    Widget,
    HiddenContext,
}

impl IdKind {
    fn prefix(self) -> &'static str {
        match self {
            IdKind::Thread => "thr",
            IdKind::Message => "msg",
            IdKind::Widget => "wdg",
            IdKind::HiddenContext => "ctx",
        }
    }
}

/// Generate a fresh id such as `thr_1f0c9a4e2b7d4c11`.
pub fn generate_id(kind: IdKind) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}_{}", kind.prefix(), &hex[..16])
}
