use crate::{
    consts::route_const::LOGIN_PATH,
    utils::html::escape,
    views::{document, submit_button},
};

pub fn render(email: &str, error: Option<&str>) -> String {
    let error = error
        .map(|message| {
            format!(
                r#"<p class="feedback error" role="alert">{}</p>"#,
                escape(message)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<div class="auth">
<h1>NAEI Admin</h1>
<p class="muted">Sign in with your Supabase credentials to manage groups and audit activity.</p>
<form method="post" action="{LOGIN_PATH}">
<div><label for="email">Admin email</label>
<input id="email" name="email" type="email" autocomplete="email" required placeholder="you@example.com" value="{email}"></div>
<div style="margin-top: 1rem"><label for="password">Password</label>
<input id="password" name="password" type="password" autocomplete="current-password" required></div>
{error}
<div class="actions">{button}</div>
</form>
<p class="muted">Need access? Contact the data platform team or review the <a href="https://supabase.com/docs">Supabase documentation</a>.</p>
</div>"#,
        email = escape(email),
        button = submit_button("Sign in", "Signing in...", None),
    );
    document("NAEI Admin | Sign in", &body)
}
