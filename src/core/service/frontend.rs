use tokio::sync::mpsc::UnboundedSender;

use crate::core::{
    model::component::DirPath,
    msg::{Alert, ForceDeletePrompt, Msg},
    traits::Frontend,
};

/// Turns frontend calls into messages for the runner loop.
#[derive(Debug, Clone)]
pub struct ChannelFrontend {
    tx: UnboundedSender<Msg>,
}

impl ChannelFrontend {
    pub fn new(tx: UnboundedSender<Msg>) -> Self {
        Self { tx }
    }

    fn send(&self, msg: Msg) {
        if self.tx.send(msg).is_err() {
            tracing::warn!("[Frontend] runner is gone, dropping message");
        }
    }
}

impl Frontend for ChannelFrontend {
    fn close_dialog(&self) {
        self.send(Msg::DialogClosed);
    }

    fn show_force_delete(&self, prompt: ForceDeletePrompt) {
        self.send(Msg::ShowForceDelete(prompt));
    }

    fn set_error_message(&self, message: String) {
        self.send(Msg::ErrorMessage(message));
    }

    fn set_delete_failed(&self, failed: bool) {
        self.send(Msg::DeleteFailed(failed));
    }

    fn add_alert(&self, alert: Alert) {
        self.send(Msg::Alert(alert));
    }

    fn location_go(&self, path: DirPath) {
        let encoded = path.encoded();
        self.send(Msg::Navigate { path, encoded });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_location_go_carries_encoded_path() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let frontend = ChannelFrontend::new(tx);
        frontend.location_go(DirPath::parse("/home/bob"));
        match rx.try_recv() {
            Ok(Msg::Navigate { path, encoded }) => {
                assert_eq!(path.join(), "/home/bob");
                assert_eq!(encoded, "%2Fhome%2Fbob");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
