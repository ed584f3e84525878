use super::helpers::attr;

pub fn new(email: &str) -> String {
    format!(
        r#"<h1>Log in</h1>
<div class="row"><div class="main">
<form action="/login" method="post">
  <label for="session_email">Email</label>
  <input id="session_email" type="email" name="email" value="{email}">
  <label for="session_password">Password</label>
  <input id="session_password" type="password" name="password">
  <label class="checkbox inline" for="session_remember_me">
    <input id="session_remember_me" type="checkbox" name="remember_me" value="1">
    <span>Remember me on this computer</span>
  </label>
  <input type="submit" value="Log in" class="btn btn-primary">
</form>
<p>New user? <a href="/signup">Sign up now!</a></p>
</div></div>"#,
        email = attr(email)
    )
}
