use std::collections::HashMap;

pub struct I18n {
    translations: HashMap<String, HashMap<String, String>>,
    current_lang: String,
}

impl I18n {
    pub fn new(lang: &str) -> Self {
        let mut translations = HashMap::new();

        // English
        let mut en = HashMap::new();
        // Shell loop
        en.insert("banner".to_string(), "Shell started. Type 'exit' to quit.".to_string());
        en.insert("banner_cwd".to_string(), "Current directory: {0}".to_string());
        en.insert("exit_message".to_string(), "Exit".to_string());

        // Help
        en.insert("help_title".to_string(), "Available commands:".to_string());
        en.insert("help_ls".to_string(), "ls [-l] [PATH]            list a directory".to_string());
        en.insert("help_cd".to_string(), "cd [PATH]                 change directory (home by default)".to_string());
        en.insert("help_cat".to_string(), "cat FILE                  print a file".to_string());
        en.insert("help_cp".to_string(), "cp [-r] SRC DST           copy a file or directory".to_string());
        en.insert("help_mv".to_string(), "mv SRC DST                move or rename".to_string());
        en.insert("help_rm".to_string(), "rm [-r] PATH              move to the trash".to_string());
        en.insert("help_zip".to_string(), "zip|tar FOLDER ARCHIVE    create an archive".to_string());
        en.insert("help_unzip".to_string(), "unzip|untar ARCHIVE       extract an archive here".to_string());
        en.insert("help_grep".to_string(), "grep [-r] [-i] PATTERN PATH   search file contents".to_string());
        en.insert("help_history".to_string(), "history [N]               show the last N commands".to_string());
        en.insert("help_undo".to_string(), "undo                      revert the last cp, mv or rm".to_string());
        en.insert("help_exit".to_string(), "exit                      leave the shell".to_string());

        // Command results
        en.insert("copied".to_string(), "Copied '{0}' to '{1}'".to_string());
        en.insert("moved".to_string(), "Moved '{0}' -> '{1}'".to_string());
        en.insert("trashed".to_string(), "'{0}' moved to the trash".to_string());
        en.insert("delete_cancelled".to_string(), "Operation cancelled.".to_string());
        en.insert("confirm_delete_dir".to_string(), "Delete directory '{0}' with all its contents? (y/n): ".to_string());
        en.insert("packed".to_string(), "Archive {0} created.".to_string());
        en.insert("unpacked".to_string(), "Archive {0} extracted.".to_string());
        en.insert("no_matches".to_string(), "No matches".to_string());
        en.insert("history_empty".to_string(), "History is empty".to_string());

        // Undo
        en.insert("nothing_to_undo".to_string(), "Nothing to undo".to_string());
        en.insert("undo_not_invertible".to_string(), "Cannot undo '{0}'".to_string());
        en.insert("undo_removed".to_string(), "Undo: '{0}' moved to the trash".to_string());
        en.insert("undo_removal_cancelled".to_string(), "Undo: removal of '{0}' cancelled".to_string());
        en.insert("undo_nothing_to_remove".to_string(), "Undo: '{0}' does not exist, nothing to remove".to_string());
        en.insert("undo_moved_back".to_string(), "Undo: moved '{0}' back to '{1}'".to_string());
        en.insert("undo_target_missing".to_string(), "Undo: target '{0}' not found".to_string());
        en.insert("undo_restored".to_string(), "Undo: '{0}' restored from the trash".to_string());

        // Errors
        en.insert("unknown_command".to_string(), "Unknown command: {0}".to_string());
        en.insert("unsupported_flags".to_string(), "Error: unsupported flags for {0}: {1}".to_string());
        en.insert("wrong_arity".to_string(), "Error: {0} expects {1} argument(s), got {2}".to_string());
        en.insert("not_found".to_string(), "Error: '{0}' not found".to_string());
        en.insert("not_in_trash".to_string(), "Restore error: '{0}' not found in the trash".to_string());
        en.insert("permission_denied".to_string(), "Error: permission denied for {0}".to_string());
        en.insert("safety_violation".to_string(), "Error: deleting the root or the parent directory is forbidden!".to_string());
        en.insert("needs_recursive".to_string(), "Error: '{0}' is a directory, the -r flag is required".to_string());
        en.insert("not_a_directory".to_string(), "Error: '{0}' is not a directory".to_string());
        en.insert("is_a_directory".to_string(), "Error: '{0}' is a directory, not a file".to_string());
        en.insert("already_exists".to_string(), "Error: '{0}' already exists".to_string());
        en.insert("io_error".to_string(), "Error while accessing {0}: {1}".to_string());
        en.insert("collaborator_error".to_string(), "Error: {0}".to_string());

        // Startup
        en.insert("error_resolve_cwd".to_string(), "Cannot determine the current directory".to_string());
        en.insert("error_create_state_dir".to_string(), "Cannot create the state directory".to_string());
        en.insert("error_read_input".to_string(), "Cannot read input".to_string());

        // Russian
        let mut ru = HashMap::new();
        ru.insert("banner".to_string(), "Запущен. Введите 'exit' для выхода".to_string());
        ru.insert("banner_cwd".to_string(), "Текущая директория {0}".to_string());
        ru.insert("exit_message".to_string(), "Выход".to_string());

        ru.insert("help_title".to_string(), "Доступные команды:".to_string());
        ru.insert("help_ls".to_string(), "ls [-l] [ПУТЬ]            содержимое каталога".to_string());
        ru.insert("help_cd".to_string(), "cd [ПУТЬ]                 сменить каталог (по умолчанию домашний)".to_string());
        ru.insert("help_cat".to_string(), "cat ФАЙЛ                  вывести файл".to_string());
        ru.insert("help_cp".to_string(), "cp [-r] ОТКУДА КУДА       копировать файл или каталог".to_string());
        ru.insert("help_mv".to_string(), "mv ОТКУДА КУДА            переместить или переименовать".to_string());
        ru.insert("help_rm".to_string(), "rm [-r] ПУТЬ              переместить в корзину".to_string());
        ru.insert("help_zip".to_string(), "zip|tar КАТАЛОГ АРХИВ     создать архив".to_string());
        ru.insert("help_unzip".to_string(), "unzip|untar АРХИВ         распаковать архив сюда".to_string());
        ru.insert("help_grep".to_string(), "grep [-r] [-i] ШАБЛОН ПУТЬ   поиск по содержимому".to_string());
        ru.insert("help_history".to_string(), "history [N]               последние N команд".to_string());
        ru.insert("help_undo".to_string(), "undo                      отменить последний cp, mv или rm".to_string());
        ru.insert("help_exit".to_string(), "exit                      выйти".to_string());

        ru.insert("copied".to_string(), "Успешно скопировано '{0}' в '{1}'".to_string());
        ru.insert("moved".to_string(), "Успешно перемещено/переименовано '{0}' -> '{1}'".to_string());
        ru.insert("trashed".to_string(), "Файл/каталог '{0}' перемещён в корзину.".to_string());
        ru.insert("delete_cancelled".to_string(), "Операция отменена.".to_string());
        ru.insert("confirm_delete_dir".to_string(), "Удалить каталог '{0}' со всем содержимым? (y/n): ".to_string());
        ru.insert("packed".to_string(), "Архив {0} успешно создан.".to_string());
        ru.insert("unpacked".to_string(), "Архив {0} успешно распакован.".to_string());
        ru.insert("no_matches".to_string(), "Нет совпадений".to_string());
        ru.insert("history_empty".to_string(), "История пуста".to_string());

        ru.insert("nothing_to_undo".to_string(), "Нечего отменять".to_string());
        ru.insert("undo_not_invertible".to_string(), "Команду '{0}' нельзя отменить".to_string());
        ru.insert("undo_removed".to_string(), "Отмена: '{0}' перемещён в корзину".to_string());
        ru.insert("undo_removal_cancelled".to_string(), "Отмена: удаление '{0}' отменено".to_string());
        ru.insert("undo_nothing_to_remove".to_string(), "Отмена: '{0}' не существует, удалять нечего".to_string());
        ru.insert("undo_moved_back".to_string(), "Отмена: '{0}' возвращён в '{1}'".to_string());
        ru.insert("undo_target_missing".to_string(), "Отмена: цель '{0}' не найдена".to_string());
        ru.insert("undo_restored".to_string(), "Объект '{0}' восстановлен из корзины.".to_string());

        ru.insert("unknown_command".to_string(), "Неизвестная команда {0}".to_string());
        ru.insert("unsupported_flags".to_string(), "Ошибка: не поддерживаемые флаги для {0}: {1}".to_string());
        ru.insert("wrong_arity".to_string(), "Ошибка: {0} ожидает аргументов: {1}, передано: {2}".to_string());
        ru.insert("not_found".to_string(), "Ошибка: '{0}' не найден(а).".to_string());
        ru.insert("not_in_trash".to_string(), "Ошибка восстановления: объект {0} не найден в корзине".to_string());
        ru.insert("permission_denied".to_string(), "Нет доступа к {0}".to_string());
        ru.insert("safety_violation".to_string(), "Ошибка: удаление корневого или родительского каталога запрещено!".to_string());
        ru.insert("needs_recursive".to_string(), "Ошибка: '{0}' является каталогом, нужен флаг -r.".to_string());
        ru.insert("not_a_directory".to_string(), "Ошибка: {0} не является каталогом.".to_string());
        ru.insert("is_a_directory".to_string(), "Ошибка: '{0}' — это директория, а не файл.".to_string());
        ru.insert("already_exists".to_string(), "Ошибка: '{0}' уже существует".to_string());
        ru.insert("io_error".to_string(), "Ошибка при обращении к {0}: {1}".to_string());
        ru.insert("collaborator_error".to_string(), "Ошибка: {0}".to_string());

        ru.insert("error_resolve_cwd".to_string(), "Не удалось определить текущую директорию".to_string());
        ru.insert("error_create_state_dir".to_string(), "Не удалось создать каталог состояния".to_string());
        ru.insert("error_read_input".to_string(), "Не удалось прочитать ввод".to_string());

        translations.insert("en".to_string(), en);
        translations.insert("ru".to_string(), ru);

        let effective_lang = if lang.starts_with("ru") || lang == "russian" {
            "ru"
        } else {
            // English for everything else
            "en"
        };

        Self {
            translations,
            current_lang: effective_lang.to_string(),
        }
    }

    pub fn t(&self, key: &str) -> String {
        if let Some(lang_map) = self.translations.get(&self.current_lang) {
            if let Some(value) = lang_map.get(key) {
                return value.clone();
            }
        }
        key.to_string()
    }

    pub fn t_format(&self, key: &str, args: &[&str]) -> String {
        let template = self.t(key);
        let mut result = template;
        for (i, arg) in args.iter().enumerate() {
            result = result.replace(&format!("{{{}}}", i), arg);
        }
        result
    }
}
