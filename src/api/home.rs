use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(
        r#"<h3>Local LLM + OpenStreetMap</h3>
<p>POST /chat {"prompt": "best seafood in Bandung"}</p>
"#,
    )
}
