// Entry Script Generation
//
// Synthesizes the source text a script-loading host executes as the entry
// point of a new background context. The script binds the task's literal
// source, installs a message handler that extracts the single logical
// payload from the envelope's first slot, and posts the return value back
// as a reply.

/// Render the background-context entry script for a task's source text
pub fn render(task_source: &str) -> String {
    [
        "\"use strict\";".to_string(),
        format!("var __task__ = {};", task_source),
        "self.onmessage = function (ev) {".to_string(),
        "  self.postMessage(".to_string(),
        "    __task__.call(self, ev.data[0])".to_string(),
        "  );".to_string(),
        "};".to_string(),
    ]
    .join("\n")
}
