//! The Jakefile: helpers, transformations, hooks and headers.

use std::rc::Rc;

use jake_lib::{Build, ConfigError, Error};

use super::common::{ROOT, load, memory_project, path};

const SCRIPT: &str = r#"
jake.helper("banner", function(build, name)
  return "/* " .. name .. " (" .. #build:files(name) .. " files) */"
end)

jake.transform("upper", function(source)
  return source:upper()
end)

created = {}
jake.on("file_created", function(build, info)
  created[#created + 1] = info.name .. ":" .. info.variant
end)

jake.on("build_complete", function(build, info)
  summary = info.written .. "/" .. info.skipped .. "/" .. info.failed
end)
"#;

const CONFIG: &str = r#"
header: HEADER
builds:
  src: []
  loud: [upper]
packages:
  core: [a]
"#;

fn scripted_project() -> (Rc<jake_lib::fs::MemoryFs>, Rc<Build>) {
  let fs = memory_project(
    CONFIG,
    &[
      ("a.js", "a"),
      ("HEADER", "<%= banner(name) %>"),
      ("Jakefile", SCRIPT),
    ],
  );
  let build = load(&fs);
  (fs, build)
}

#[test]
fn script_transforms_run_in_variants() {
  let (_, build) = scripted_project();
  assert_eq!(&*build.package("core").unwrap().code("loud").unwrap(), "A");
}

#[test]
fn headers_call_helpers() {
  let (fs, build) = scripted_project();
  assert!(build.run().is_success());
  assert_eq!(
    fs.contents(&path("core-loud.js")).as_deref(),
    Some("/* core (1 files) */\nA")
  );
}

#[test]
fn hooks_fire_per_file_and_once_per_run() {
  let (_, build) = scripted_project();
  build.run();

  let lua = build.scope().lua();
  let created: Vec<String> = lua.load("return created").eval().unwrap();
  assert_eq!(created, vec!["core:src", "core:loud"]);
  let summary: String = lua.load("return summary").eval().unwrap();
  assert_eq!(summary, "2/0/0");

  build.run();
  let summary: String = lua.load("return summary").eval().unwrap();
  assert_eq!(summary, "0/2/0");
}

#[test]
fn registrations_do_not_leak_between_builds() {
  let (_, scripted) = scripted_project();
  let fs = memory_project(CONFIG, &[("a.js", "a")]);
  let plain = Build::load_with(ROOT, fs).unwrap();

  assert!(scripted.invoke_helper("banner", &["core".to_string()]).is_ok());
  let err = plain.invoke_helper("banner", &["core".to_string()]).unwrap_err();
  assert!(matches!(err.as_config(), Some(ConfigError::UnknownHelper(_))));
  assert!(plain.package("core").unwrap().code("loud").is_err());
}

#[test]
fn reloading_a_script_registers_the_same_names() {
  let (fs, first) = scripted_project();
  let second = load(&fs);
  assert_eq!(
    first.scope().helper_names().unwrap(),
    second.scope().helper_names().unwrap()
  );
}

#[test]
fn builtin_transforms_cannot_be_overridden() {
  let fs = memory_project(
    "packages:\n  core: [a]",
    &[("Jakefile", r#"jake.transform("trim_lines", function(s) return s end)"#)],
  );
  let err = Build::load_with(ROOT, fs).err().unwrap();
  assert!(matches!(err, Error::Lua(_)));
  assert!(err.to_string().contains("cannot override built-in transformation"));
}

#[test]
fn helpers_see_the_build_from_the_command_line() {
  let (_, build) = scripted_project();
  assert_eq!(
    build.invoke_helper("banner", &["core".to_string()]).unwrap(),
    Some("/* core (1 files) */".to_string())
  );
}
