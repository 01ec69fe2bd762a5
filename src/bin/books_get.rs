use bookshelf::{launcher, service::Service};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    launcher::launch(Service::List).await
}
