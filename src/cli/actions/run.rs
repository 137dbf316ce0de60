use super::{reset, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Reset(args) => reset::handle(args).await,
    }
}
