/// Name of this machine, used to identify who built an artifact.
#[cfg(unix)]
pub fn hostname() -> String {
  let uname = rustix::system::uname();
  let name = uname.nodename().to_string_lossy();
  if name.is_empty() {
    return "localhost".to_string();
  }
  name.into_owned()
}

/// Name of this machine, used to identify who built an artifact.
#[cfg(windows)]
pub fn hostname() -> String {
  std::env::var("COMPUTERNAME")
    .ok()
    .filter(|n| !n.is_empty())
    .unwrap_or_else(|| "localhost".to_string())
}
