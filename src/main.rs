use fetchpoint::Fetchpoint;
use miette::Result;

#[async_std::main]
async fn main() -> Result<()> {
    Fetchpoint::load().await
}
