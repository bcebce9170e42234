//! End-to-end behavior of the renderer on whole layouts.

use std::cell::Cell;
use tagfetch_exec::{CommandOutput, ShellError, ShellRunner};
use tagfetch_render::{
    render_layout, visual_width, BoxLayout, ModuleRegistry, OutputTarget, RenderContext,
    RenderError, RoomLayoutInfo, YamlConfig, CUT_LINE,
};

fn fake_shell(cmd: &str) -> Result<CommandOutput, ShellError> {
    Ok(CommandOutput::from_stdout(format!(
        "{}\n",
        cmd.strip_prefix("echo ").unwrap_or(cmd)
    )))
}

#[test]
fn line_without_tags_is_unchanged() {
    let registry = ModuleRegistry::new();
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    for line in ["plain", "Uptime: 3 days", "", "  spaced  ", "price $5 : ok", "日本語"] {
        assert_eq!(ctx.render_line(line), [line]);
    }
    assert!(ctx.diagnostics.is_empty());
}

#[test]
fn module_tag_resolves() {
    let registry = ModuleRegistry::new().with("modification.test", |_, _| "Hello!".to_string());
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    assert_eq!(ctx.resolve("$<modification.test>"), "Hello!");
}

#[cfg(unix)]
#[test]
fn command_tag_runs_real_shell() {
    let registry = ModuleRegistry::new();
    let config = YamlConfig::new();
    let runner = ShellRunner::new();
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    assert_eq!(ctx.resolve("$(echo hello)"), "hello");
}

#[test]
fn conditional_follows_module_value() {
    let name = std::rc::Rc::new(Cell::new("toni"));
    let source = name.clone();
    let registry = ModuleRegistry::new().with("user.name", move |_, _| source.get().to_string());
    let config = YamlConfig::new();
    let runner = fake_shell;
    let line = "$[$<user.name>,toni,Welcome back!,Access denied]";

    let mut ctx = RenderContext::new(&registry, &config, &runner);
    assert_eq!(ctx.resolve(line), "Welcome back!");

    name.set("bob");
    let mut ctx = RenderContext::new(&registry, &config, &runner);
    assert_eq!(ctx.resolve(line), "Access denied");
}

#[test]
fn percentage_colors() {
    let registry = ModuleRegistry::new();
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    // normal = yellow
    assert_eq!(ctx.resolve("$%50,100%"), "\x1b[1;33m50.00%\x1b[0m");
    // bad ratio, inverted to good = green
    assert_eq!(ctx.resolve("$%!10,100%"), "\x1b[1;32m10.00%\x1b[0m");
}

#[test]
fn pin_geometry_and_rewrite() {
    let lines = ["A$<pin>1", "BB$<pin>22"];
    let info = RoomLayoutInfo::measure(&lines);
    assert_eq!(info.pin_position, 2);
    assert_eq!(info.total_width, 4);

    let layout = BoxLayout::default();
    let first = layout.rewrite_line(lines[0], info);
    assert_eq!(visual_width(&first), 4);
    assert!(first.ends_with('1'));
    assert_eq!(layout.rewrite_line(lines[1], info), "BB22");
}

#[test]
fn fill_expansion_in_room() {
    let registry = ModuleRegistry::new();
    let config =
        YamlConfig::from_yaml("config:\n  box-chars:\n    horizontal: \"-\"\n").unwrap();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    let out = render_layout(
        &mut ctx,
        &["room", "0123456789", "A$<fill>B$<fill>C", "endroom"],
    );
    assert_eq!(out, ["0123456789", "A----B---C"]);
}

#[test]
fn unterminated_tag_does_not_abort() {
    let registry = ModuleRegistry::new().with("os.name", |_, _| "Linux".to_string());
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    let out = render_layout(&mut ctx, &["$<os.name", "OS $<os.name>"]);
    assert_eq!(out, ["$<os.name", "OS Linux"]);
    assert!(matches!(
        ctx.diagnostics[..],
        [RenderError::UnterminatedTag { offset: 0, .. }]
    ));
}

#[test]
fn unterminated_room_is_reported() {
    let registry = ModuleRegistry::new();
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    let out = render_layout(&mut ctx, &["room", "a$<pin>b"]);
    assert_eq!(out, ["room", "a$<pin>b"]);
    assert_eq!(ctx.diagnostics, vec![RenderError::UnterminatedRoom(0)]);
}

#[test]
fn unterminated_room_names_its_layout_line() {
    let registry = ModuleRegistry::new()
        .with("gpus", |_, _| "RTX\nArc".to_string())
        .with("battery", |_, _| CUT_LINE.to_string());
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    let out = render_layout(
        &mut ctx,
        &["$<gpus>", "$<gpus>", "Battery $<battery>", "room", "z"],
    );
    assert_eq!(out, ["RTX", "Arc", "RTX", "Arc", "room", "z"]);
    assert_eq!(ctx.diagnostics, vec![RenderError::UnterminatedRoom(3)]);
}

#[test]
fn aligned_colored_room() {
    let registry = ModuleRegistry::new()
        .with("os.name", |_, _| "Linux".to_string())
        .with("kernel", |_, _| "6.9.1".to_string());
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    let out = render_layout(
        &mut ctx,
        &[
            "room",
            "${red}OS$<pin>: $<os.name>",
            "${red}Kernel$<pin>: $<kernel>",
            "endroom",
        ],
    );
    let widths: Vec<usize> = out.iter().map(|l| visual_width(l)).collect();
    assert_eq!(widths, [13, 13]);
    assert_eq!(out[0], "\x1b[1;31mOS    \x1b[0m: Linux");
}

#[test]
fn gui_layout_is_markup() {
    let registry = ModuleRegistry::new().with("os.name", |_, _| "Linux".to_string());
    let config = YamlConfig::new();
    let runner = fake_shell;
    let mut ctx = RenderContext::new(&registry, &config, &runner).with_target(OutputTarget::Gui);

    let out = render_layout(&mut ctx, &["${#00ff00}OS\\> $<os.name>"]);
    assert_eq!(out, ["<span fgcolor='#00ff00'>OS&gt; Linux</span>"]);
}

#[test]
fn commands_can_be_disallowed() {
    let registry = ModuleRegistry::new();
    let mut config = YamlConfig::new();
    config.set("intern.args.disallow-commands", true);
    let runner = |_: &str| -> Result<CommandOutput, ShellError> {
        panic!("command must not run");
    };
    let mut ctx = RenderContext::new(&registry, &config, &runner);

    assert_eq!(ctx.resolve("$(echo hi)"), "$(echo hi)");
}
