use hz_http_client::{ClientConfig, HttpClient, ServiceError};
use serde::{Deserialize, Serialize};

const USER_NOT_FOUND: ServiceError = ServiceError::new("USER_NOT_FOUND", 404);

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    name: String,
}

#[derive(Serialize)]
struct NewUser<'a> {
    name: &'a str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env("USER_SERVICE")?;
    let client = HttpClient::new(config)?.with_error_mappings([
        ("USER_NOT_FOUND", USER_NOT_FOUND),
        ("BAD_REQUEST", ServiceError::BAD_REQUEST),
    ]);

    let created: User = client
        .post(&format!("{}/users", client.v1_url()), &NewUser { name: "Kit" })
        .await?;
    println!("created {created:?}");

    match client
        .get::<User>(&format!("{}/users/{}", client.v1_url(), created.id + 1))
        .await
    {
        Ok(user) => println!("found {} ({})", user.name, user.id),
        Err(err) if err.is(&USER_NOT_FOUND) => println!("no such user: {err}"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
